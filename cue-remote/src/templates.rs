//! Bundled templates.

use std::sync::Arc;

use tracing::{info, warn};

use cue_core::{CommandSink, RenameTable, Template, decode};

use crate::config::TemplateKind;

/// Instantiate the configured template.
pub fn build_template(
    kind: TemplateKind,
    renames: RenameTable,
    sink: Arc<dyn CommandSink>,
) -> Box<dyn Template> {
    match kind {
        TemplateKind::LowerThird => Box::new(LowerThird::new(renames)),
        TemplateKind::MixerCycle => Box::new(MixerCycle::new(sink)),
        TemplateKind::Placeholder => Box::new(Placeholder),
    }
}

// ── LowerThird ───────────────────────────────────────────────────

/// Two-line caption fed by `update` data.
///
/// Reads the canonical keys `line1` and `line2`; the rename table maps the
/// playout server's field names onto them.
#[derive(Debug)]
pub struct LowerThird {
    renames: RenameTable,
    lines: [String; 2],
    visible: bool,
}

impl LowerThird {
    pub fn new(renames: RenameTable) -> Self {
        if renames.is_empty() {
            warn!("no renames configured, expecting line1/line2 keys verbatim");
        }
        Self {
            renames,
            lines: Default::default(),
            visible: false,
        }
    }

    pub fn lines(&self) -> (&str, &str) {
        (&self.lines[0], &self.lines[1])
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Template for LowerThird {
    fn name(&self) -> &str {
        "lower-third"
    }

    fn play(&mut self) {
        self.visible = true;
        info!(line1 = %self.lines[0], line2 = %self.lines[1], "lower third in");
    }

    fn stop(&mut self) {
        self.visible = false;
        info!("lower third out");
    }

    fn update(&mut self, data: &str) {
        let params = decode(data, &self.renames);
        for (slot, key) in self.lines.iter_mut().zip(["line1", "line2"]) {
            if let Some(value) = params.get(key) {
                *slot = value.clone();
            }
        }
        info!(line1 = %self.lines[0], line2 = %self.lines[1], "lower third updated");
    }
}

// ── MixerCycle ───────────────────────────────────────────────────

/// Fill positions for a quarter-size layer, one per screen quadrant.
const QUADRANTS: [&str; 4] = [
    "MIXER 1-90 FILL 0 0 .5 .5 25",
    "MIXER 1-90 FILL .5 0 .5 .5 25",
    "MIXER 1-90 FILL .5 .5 .5 .5 25",
    "MIXER 1-90 FILL 0 .5 .5 .5 25",
];

/// Plays a colour on layer 1-90 and moves it round the screen quadrants,
/// one step per `update`.
pub struct MixerCycle {
    sink: Arc<dyn CommandSink>,
    step: usize,
}

impl MixerCycle {
    pub fn new(sink: Arc<dyn CommandSink>) -> Self {
        Self { sink, step: 0 }
    }

    fn send(&self, command: &str) {
        if let Err(e) = self.sink.submit(command.to_string()) {
            warn!(%command, "command not submitted: {e}");
        }
    }
}

impl Template for MixerCycle {
    fn name(&self) -> &str {
        "mixer-cycle"
    }

    fn play(&mut self) {
        self.send("MIXER 1-90 CLEAR");
        self.send("PLAY 1-90 #ff0000 MIX 25");
    }

    fn stop(&mut self) {
        self.send("MIXER 1-90 CLEAR");
        self.send("CLEAR 1-90");
    }

    fn update(&mut self, _data: &str) {
        self.send(QUADRANTS[self.step % QUADRANTS.len()]);
        self.step += 1;
    }
}

// ── Placeholder ──────────────────────────────────────────────────

/// A template with no behaviour of its own.
pub struct Placeholder;

impl Template for Placeholder {
    fn name(&self) -> &str {
        "placeholder"
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cue_core::CueError;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl CommandSink for Recorder {
        fn submit(&self, command: String) -> Result<(), CueError> {
            self.0.lock().unwrap().push(command);
            Ok(())
        }
    }

    fn renames() -> RenameTable {
        [("f0", "line1"), ("f1", "line2")].into_iter().collect()
    }

    #[test]
    fn lower_third_reads_renamed_json_fields() {
        let mut lt = LowerThird::new(renames());
        lt.update(r#"{"f0":"Alice","f1":"Producer"}"#);
        assert_eq!(lt.lines(), ("Alice", "Producer"));
    }

    #[test]
    fn lower_third_reads_template_data_xml() {
        let mut lt = LowerThird::new(renames());
        lt.update(
            r#"<templateData><componentData id="f0"><data id="text" value="Bob"/></componentData></templateData>"#,
        );
        assert_eq!(lt.lines(), ("Bob", ""));
    }

    #[test]
    fn lower_third_keeps_lines_missing_from_update() {
        let mut lt = LowerThird::new(renames());
        lt.update(r#"{"f0":"Alice","f1":"Producer"}"#);
        lt.update(r#"{"f1":"Director"}"#);
        lt.update("garbage");
        assert_eq!(lt.lines(), ("Alice", "Director"));
    }

    #[test]
    fn lower_third_without_renames_reads_canonical_keys() {
        let mut lt = LowerThird::new(RenameTable::new());
        lt.update(r#"{"f0":"Alice","line2":"Producer"}"#);
        assert_eq!(lt.lines(), ("", "Producer"));
    }

    #[test]
    fn lower_third_visibility_follows_play_and_stop() {
        let mut lt = LowerThird::new(renames());
        assert!(!lt.is_visible());
        lt.play();
        assert!(lt.is_visible());
        lt.stop();
        assert!(!lt.is_visible());
    }

    #[test]
    fn mixer_cycle_sends_play_update_stop_sequence() {
        let recorder = Arc::new(Recorder::default());
        let mut mixer = MixerCycle::new(recorder.clone());

        mixer.play();
        for _ in 0..5 {
            mixer.update("");
        }
        mixer.stop();

        let sent = recorder.0.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![
                "MIXER 1-90 CLEAR",
                "PLAY 1-90 #ff0000 MIX 25",
                QUADRANTS[0],
                QUADRANTS[1],
                QUADRANTS[2],
                QUADRANTS[3],
                QUADRANTS[0],
                "MIXER 1-90 CLEAR",
                "CLEAR 1-90",
            ]
        );
    }

    #[test]
    fn build_template_selects_kind() {
        let sink: Arc<dyn CommandSink> = Arc::new(Recorder::default());
        for (kind, name) in [
            (TemplateKind::LowerThird, "lower-third"),
            (TemplateKind::MixerCycle, "mixer-cycle"),
            (TemplateKind::Placeholder, "placeholder"),
        ] {
            let template = build_template(kind, renames(), Arc::clone(&sink));
            assert_eq!(template.name(), name);
        }
    }
}
