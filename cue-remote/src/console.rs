//! Line-oriented hook console.
//!
//! ```text
//! play | stop | next        lifecycle hooks
//! update <data>             parameter payload, JSON or XML
//! send <command>            raw command to the playout server
//! quit                      end the session
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use cue_core::{CommandSink, CueError, Template};

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    Play,
    Stop,
    Next,
    Update(String),
    Send(String),
    Quit,
}

/// Parse a console line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<HookCall>, CueError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };

    let call = match verb.to_ascii_lowercase().as_str() {
        "play" => HookCall::Play,
        "stop" => HookCall::Stop,
        "next" => HookCall::Next,
        "update" => HookCall::Update(rest.to_string()),
        "send" if rest.is_empty() => {
            return Err(CueError::Other("send needs a command".into()));
        }
        "send" => HookCall::Send(rest.to_string()),
        "quit" | "exit" => HookCall::Quit,
        other => return Err(CueError::Other(format!("unknown hook: {other}"))),
    };
    Ok(Some(call))
}

/// Apply a call to the template or the sink. `Quit` is a no-op here.
pub fn dispatch(
    call: HookCall,
    template: &mut dyn Template,
    sink: &dyn CommandSink,
) -> Result<(), CueError> {
    match call {
        HookCall::Play => template.play(),
        HookCall::Stop => template.stop(),
        HookCall::Next => template.next(),
        HookCall::Update(data) => template.update(&data),
        HookCall::Send(command) => sink.submit(command)?,
        HookCall::Quit => {}
    }
    Ok(())
}

/// Read lines until EOF or `quit`, dispatching each one.
///
/// Bad lines are logged and skipped; only read errors end the session early.
pub async fn run<R>(
    reader: R,
    template: &mut dyn Template,
    sink: &dyn CommandSink,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(HookCall::Quit)) => {
                info!("quit requested");
                break;
            }
            Ok(Some(call)) => {
                if let Err(e) = dispatch(call, template, sink) {
                    warn!("hook failed: {e}");
                }
            }
            Err(e) => warn!("{e}"),
        }
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl CommandSink for Recorder {
        fn submit(&self, command: String) -> Result<(), CueError> {
            self.0.lock().unwrap().push(command);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Journal(Vec<String>);

    impl Template for Journal {
        fn name(&self) -> &str {
            "journal"
        }

        fn play(&mut self) {
            self.0.push("play".into());
        }

        fn stop(&mut self) {
            self.0.push("stop".into());
        }

        fn update(&mut self, data: &str) {
            self.0.push(format!("update {data}"));
        }
    }

    #[test]
    fn parses_hooks() {
        assert_eq!(parse_line("play").unwrap(), Some(HookCall::Play));
        assert_eq!(parse_line("  STOP  ").unwrap(), Some(HookCall::Stop));
        assert_eq!(parse_line("next").unwrap(), Some(HookCall::Next));
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("quit").unwrap(), Some(HookCall::Quit));
    }

    #[test]
    fn update_keeps_payload_verbatim() {
        let call = parse_line(r#"update {"f0": "Alice Smith"}"#).unwrap();
        assert_eq!(call, Some(HookCall::Update(r#"{"f0": "Alice Smith"}"#.into())));

        assert_eq!(parse_line("update").unwrap(), Some(HookCall::Update(String::new())));
    }

    #[test]
    fn send_requires_a_command() {
        assert_eq!(
            parse_line("send PLAY 1-10 AMB").unwrap(),
            Some(HookCall::Send("PLAY 1-10 AMB".into()))
        );
        assert!(parse_line("send").is_err());
    }

    #[test]
    fn unknown_verb_is_an_error() {
        assert!(matches!(parse_line("rewind"), Err(CueError::Other(_))));
    }

    #[tokio::test]
    async fn run_dispatches_until_quit() {
        let input = b"play\n\nupdate {\"f0\":\"Alice\"}\nbogus\nsend CLEAR 1-90\nnext\nquit\nstop\n";
        let mut template = Journal::default();
        let sink = Recorder::default();

        run(&input[..], &mut template, &sink).await.unwrap();

        assert_eq!(template.0, vec!["play", "update {\"f0\":\"Alice\"}"]);
        assert_eq!(*sink.0.lock().unwrap(), vec!["CLEAR 1-90"]);
    }

    #[tokio::test]
    async fn run_stops_at_eof() {
        let input = b"play\nstop";
        let mut template = Journal::default();
        let sink = Recorder::default();

        run(&input[..], &mut template, &sink).await.unwrap();

        assert_eq!(template.0, vec!["play", "stop"]);
    }
}
