//! Template lifecycle hooks.
//!
//! The playout server drives a template through four calls. A template
//! overrides the ones it supports; the rest only log.

use tracing::info;

pub trait Template: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn play(&mut self) {
        info!(template = self.name(), "play is not implemented");
    }

    fn stop(&mut self) {
        info!(template = self.name(), "stop is not implemented");
    }

    fn next(&mut self) {
        info!(template = self.name(), "next is not implemented");
    }

    /// `data` is the raw parameter payload, JSON or XML.
    fn update(&mut self, data: &str) {
        info!(
            template = self.name(),
            bytes = data.len(),
            "update is not implemented"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlayOnly {
        plays: u32,
    }

    impl Template for PlayOnly {
        fn name(&self) -> &str {
            "play-only"
        }

        fn play(&mut self) {
            self.plays += 1;
        }
    }

    #[test]
    fn unimplemented_hooks_are_harmless() {
        let mut template = PlayOnly { plays: 0 };
        let hooks: &mut dyn Template = &mut template;

        hooks.play();
        hooks.stop();
        hooks.next();
        hooks.update(r#"{"f0":"Alice"}"#);
        hooks.play();

        assert_eq!(template.plays, 2);
    }
}
