use clap::Subcommand;

/// Log filter directive: `RUST_LOG` when set, otherwise `debug` with
/// `--verbose` and `info` without.
pub fn log_directive<'a>(verbose: bool, rust_log: Option<&'a str>) -> &'a str {
    match rust_log.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive,
        _ if verbose => "debug",
        _ => "info",
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the supported target languages
    Languages,

    /// List the learning goals
    Goals,

    /// Explain a grammar topic
    Grammar {
        topic: String,
    },

    /// Build a vocabulary table for a theme
    Vocab {
        theme: String,
    },

    /// Correct and rate a piece of writing
    Write {
        text: String,
    },

    /// Translate text into the target language, with notes
    Translate {
        text: String,
    },

    /// Pronunciation guide for a phrase
    Pronounce {
        text: String,
    },

    /// Five-day study plan
    Plan {
        /// Beginner, Intermediate or Advanced
        #[arg(long, default_value = "Beginner")]
        level: String,
    },

    /// Interactive multiple-choice quiz
    Quiz {
        topic: String,

        /// Beginner, Intermediate or Advanced
        #[arg(short, long, default_value = "Intermediate")]
        difficulty: String,
    },

    /// Conversation practice with the tutor (type /quit to end)
    Chat {
        topic: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_directive_prefers_rust_log() {
        assert_eq!(log_directive(false, Some("polyglot=trace")), "polyglot=trace");
        assert_eq!(log_directive(true, Some("warn")), "warn");
    }

    #[test]
    fn log_directive_falls_back_to_verbosity() {
        assert_eq!(log_directive(false, None), "info");
        assert_eq!(log_directive(true, None), "debug");
        assert_eq!(log_directive(true, Some("  ")), "debug");
    }
}
