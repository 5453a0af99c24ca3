use std::fmt::Write as _;

use crate::vm::ExamVm;

/// Renders the exam page as plain text for a terminal.
#[must_use]
pub fn render_text(vm: &ExamVm) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}]", vm.timer_label);

    let nav: Vec<String> = vm
        .nav
        .iter()
        .map(|button| {
            let mark = if button.answered { "*" } else { "" };
            if button.active {
                format!("[{}{mark}]", button.label)
            } else {
                format!(" {}{mark} ", button.label)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", nav.join(""));

    if let Some(panel) = vm.visible_panel() {
        let _ = writeln!(out, "\n{}\n{}", panel.title, panel.text);
        for (position, option) in panel.options.iter().enumerate() {
            let radio = if option.selected { "(x)" } else { "( )" };
            let _ = writeln!(out, "  {radio} {}. {}", position + 1, option.label);
        }
    }

    let mut controls = Vec::new();
    if vm.controls.previous_enabled {
        controls.push("[Previous]".to_string());
    } else {
        controls.push("(Previous)".to_string());
    }
    if let Some(next) = &vm.controls.next {
        if next.enabled {
            controls.push(format!("[{}]", next.label));
        } else {
            controls.push(format!("({})", next.label));
        }
    }
    if vm.controls.submit_visible {
        controls.push("[Submit]".to_string());
    }
    let _ = writeln!(out, "\n{}", controls.join(" "));

    for notice in &vm.notices {
        let _ = writeln!(out, "! {notice}");
    }
    out
}
