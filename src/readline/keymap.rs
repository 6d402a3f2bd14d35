//! Key binding table
//!
//! A [`Keymap`] is built once, from inputrc text or programmatically through
//! [`KeymapBuilder`], and is read-only afterwards. Sessions share it through
//! an `Arc`.

use std::fs::File;
use std::path::Path;

use super::inputrc::{self, Diagnostic, Entry, Inputrc};
use crate::app::Config;
use crate::error::Result;

/// Bindings shipped with the crate
const BUNDLED_INPUTRC: &str = include_str!("default.inputrc");

/// What a key sequence is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Named line editor function
    Function(String),
    /// Literal text replayed as if typed
    Macro(String),
}

/// Left-hand side of a binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySpec {
    Sequence(Vec<char>),
    /// Symbolic key name that could not be resolved to a sequence
    Name(String),
}

/// A key sequence bound to an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    sequence: Vec<char>,
    action: Action,
}

impl KeyBinding {
    pub fn new(sequence: Vec<char>, action: Action) -> Self {
        Self { sequence, action }
    }

    pub fn sequence(&self) -> &[char] {
        &self.sequence
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Immutable set of key bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
    /// Bindings by unresolved key name, kept for the line editor
    named: Vec<(String, Action)>,
}

impl Keymap {
    pub fn builder() -> KeymapBuilder {
        KeymapBuilder::default()
    }

    /// Build from inputrc text, logging diagnostics
    pub fn parse(text: &str) -> Self {
        Self::from_inputrc_logged(inputrc::parse(text))
    }

    /// Build from inputrc text, returning diagnostics to the caller
    pub fn parse_with_diagnostics(text: &str) -> (Self, Vec<Diagnostic>) {
        Self::from_inputrc(inputrc::parse(text))
    }

    /// Build from an inputrc file
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD and parsing
    /// continues.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Loading key bindings from {:?}", path);
        let parsed = inputrc::parse_reader(File::open(path)?)?;
        Ok(Self::from_inputrc_logged(parsed))
    }

    /// Build from the bundled default inputrc
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_INPUTRC)
    }

    /// Build from the configured inputrc, or the bundled one
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.inputrc {
            Some(path) => Self::load(path),
            None => Ok(Self::bundled()),
        }
    }

    fn from_inputrc(parsed: Inputrc) -> (Self, Vec<Diagnostic>) {
        let mut builder = Self::builder();
        for Entry { key, action, .. } in parsed.entries {
            builder = builder.bind(key, action);
        }
        (builder.build(), parsed.diagnostics)
    }

    fn from_inputrc_logged(parsed: Inputrc) -> Self {
        let (keymap, diagnostics) = Self::from_inputrc(parsed);
        for diagnostic in &diagnostics {
            tracing::warn!("inputrc: {}", diagnostic);
        }
        keymap
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    pub fn named(&self) -> &[(String, Action)] {
        &self.named
    }

    /// Action bound to exactly `sequence`
    pub fn lookup(&self, sequence: &[char]) -> Option<&Action> {
        self.bindings
            .iter()
            .find(|b| b.sequence() == sequence)
            .map(KeyBinding::action)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Collects bindings for a [`Keymap`]
///
/// Binding a sequence that is already bound replaces the earlier action.
#[derive(Debug, Default)]
pub struct KeymapBuilder {
    keymap: Keymap,
}

impl KeymapBuilder {
    pub fn bind(mut self, key: KeySpec, action: Action) -> Self {
        match key {
            KeySpec::Sequence(sequence) => {
                let bindings = &mut self.keymap.bindings;
                match bindings.iter().position(|b| b.sequence == sequence) {
                    Some(i) => bindings[i].action = action,
                    None => bindings.push(KeyBinding::new(sequence, action)),
                }
            }
            KeySpec::Name(name) => {
                let named = &mut self.keymap.named;
                match named.iter().position(|(n, _)| *n == name) {
                    Some(i) => named[i].1 = action,
                    None => named.push((name, action)),
                }
            }
        }
        self
    }

    pub fn bind_function(self, sequence: &[char], name: &str) -> Self {
        self.bind(
            KeySpec::Sequence(sequence.to_vec()),
            Action::Function(name.to_string()),
        )
    }

    pub fn bind_macro(self, sequence: &[char], text: &str) -> Self {
        self.bind(
            KeySpec::Sequence(sequence.to_vec()),
            Action::Macro(text.to_string()),
        )
    }

    pub fn build(self) -> Keymap {
        self.keymap
    }
}
