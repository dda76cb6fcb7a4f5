//! Dotted-numeric version comparison (`1.10.2` style).

use std::cmp::Ordering;

/// Compare two version strings component by component.
///
/// Components are separated by `.` and compared numerically. The shorter
/// version is padded with zeros, so `1.2` equals `1.2.0`. A component with
/// no leading digits counts as zero.
pub fn compare_version(left: &str, right: &str) -> Ordering {
    let mut l = left.split('.');
    let mut r = right.split('.');

    loop {
        match (l.next(), r.next()) {
            (None, None) => return Ordering::Equal,
            (lc, rc) => {
                let ord = component_value(lc).cmp(&component_value(rc));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn component_value(component: Option<&str>) -> u64 {
    let Some(text) = component else {
        return 0;
    };
    let digits: &str = {
        let text = text.trim_start();
        let end = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        &text[..end]
    };
    digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u64::MAX })
}
