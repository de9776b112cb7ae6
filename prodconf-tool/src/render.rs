//! Colored text rendering of a configuration tree.

use colored::Colorize;
use prodconf::{FeatureNode, OptionNode, SelectionKind, render::TreeRenderer};

/// Indented outline with selection markers.
///
/// Select-one options print as `(*)`/`( )`, select-many options as
/// `[x]`/`[ ]`. Group options have no marker.
#[derive(Default)]
pub struct ColoredTree {
    lines: Vec<String>,
}

impl ColoredTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }

    fn feature(&mut self, feature: &FeatureNode, depth: usize, tag: &str) {
        let mut line = format!(
            "{}{} {}",
            "  ".repeat(depth),
            feature.code().bold(),
            tag.dimmed()
        );
        if feature.is_optional() {
            line.push_str(&format!(" {}", "optional".dimmed()));
        }
        if !feature.description().is_empty() {
            line.push_str(&format!(" - {}", feature.description()));
        }
        self.lines.push(line);
    }
}

impl TreeRenderer for ColoredTree {
    fn group(&mut self, feature: &FeatureNode, depth: usize) {
        self.feature(feature, depth, "group");
    }

    fn select_one(&mut self, feature: &FeatureNode, depth: usize) {
        self.feature(feature, depth, "one");
    }

    fn select_many(&mut self, feature: &FeatureNode, depth: usize) {
        self.feature(feature, depth, "many");
    }

    fn option(&mut self, feature: &FeatureNode, option: &OptionNode, depth: usize) {
        let marker = match (feature.kind(), option.is_selected()) {
            (SelectionKind::Group, _) => "-".normal(),
            (SelectionKind::SelectOne, true) => "(*)".green(),
            (SelectionKind::SelectOne, false) => "( )".normal(),
            (SelectionKind::SelectMany, true) => "[x]".green(),
            (SelectionKind::SelectMany, false) => "[ ]".normal(),
        };
        let code = if option.is_selected() {
            option.code().green().to_string()
        } else {
            option.code().to_string()
        };
        self.lines
            .push(format!("{}  {marker} {code}", "  ".repeat(depth)));
    }
}
