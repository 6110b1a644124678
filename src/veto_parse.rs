use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};

use crate::report_parse::{SELECTORS, element_text};

const VETO_KEYWORDS: &[&str] = &["removed", "picked", "was left over"];

static NUMBERED_STEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+\.\s*(?:removed|picked|was left over)")
        .unwrap_or_else(|err| panic!("invalid veto step pattern: {err}"))
});

/// Which rule produced the veto log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetoSource {
    /// A metadata box mentioned a veto keyword. Its steps may still be empty.
    Primary,
    Fallback,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VetoSteps {
    pub steps: Vec<String>,
    pub source: VetoSource,
}

pub fn extract_veto(section: ElementRef<'_>) -> VetoSteps {
    if let Some(steps) = primary_veto(section) {
        return VetoSteps {
            steps,
            source: VetoSource::Primary,
        };
    }

    let steps = fallback_veto(section);
    let source = if steps.is_empty() {
        VetoSource::None
    } else {
        VetoSource::Fallback
    };
    VetoSteps { steps, source }
}

/// `None` when no metadata box qualifies; the first qualifying box ends the scan.
fn primary_veto(section: ElementRef<'_>) -> Option<Vec<String>> {
    for veto_box in section.select(&SELECTORS.veto_box) {
        let Some(padding) = veto_box.select(&SELECTORS.padding).next() else {
            continue;
        };
        let text = padding.text().collect::<String>().to_lowercase();
        if !mentions_veto(&text) {
            continue;
        }
        let steps = padding
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "div")
            .map(element_text)
            .filter(|step| !step.is_empty())
            .collect();
        return Some(steps);
    }
    None
}

fn mentions_veto(lowercase_text: &str) -> bool {
    VETO_KEYWORDS
        .iter()
        .any(|keyword| lowercase_text.contains(keyword))
}

/// Divs anywhere in the section whose sole text reads like a numbered veto step.
fn fallback_veto(section: ElementRef<'_>) -> Vec<String> {
    section
        .select(&SELECTORS.div)
        .filter_map(sole_text)
        .map(str::trim)
        .filter(|text| !text.is_empty() && NUMBERED_STEP.is_match(text))
        .map(str::to_string)
        .collect()
}

/// Follows single-child elements down to a lone text node. A chain that passes
/// through another div yields nothing here; that inner div is visited on its own.
fn sole_text(div: ElementRef<'_>) -> Option<&str> {
    let mut node = *div;
    loop {
        let mut children = node.children();
        let child = children.next()?;
        if children.next().is_some() {
            return None;
        }
        match child.value() {
            Node::Text(text) => return Some(&**text),
            Node::Element(element) if element.name() != "div" => node = child,
            _ => return None,
        }
    }
}
