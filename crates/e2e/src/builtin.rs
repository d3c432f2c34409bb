//! Built-in scenarios for the admin editor toolbar and the login page

use std::path::PathBuf;

use crate::scenario::{AttributeCheck, Scenario, Step, Viewport};

pub const EDITOR_SHORTCUTS: &str = "editor-shortcuts";
pub const LOGIN_PASSWORD_TOGGLE: &str = "login-password-toggle";

/// A toolbar button and the key its shortcut is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarControl {
    pub label: &'static str,
    pub key: char,
}

/// Controls whose tooltip and `aria-keyshortcuts` are checked, in order
pub const TOOLBAR_CONTROLS: [ToolbarControl; 3] = [
    ToolbarControl { label: "Bold", key: 'b' },
    ToolbarControl { label: "Italic", key: 'i' },
    ToolbarControl { label: "Link", key: 'k' },
];

impl ToolbarControl {
    pub fn selector(&self) -> String {
        format!("button[title*='{}']", self.label)
    }

    /// e.g. `Bold (Cmd/Ctrl+B)`
    pub fn expected_title(&self) -> String {
        format!("{} (Cmd/Ctrl+{})", self.label, self.key.to_ascii_uppercase())
    }

    /// e.g. `Meta+b Control+b`
    pub fn expected_shortcuts(&self) -> String {
        format!("Meta+{key} Control+{key}", key = self.key)
    }

    pub fn checks(&self) -> [AttributeCheck; 2] {
        [
            AttributeCheck::new(self.selector(), "title", self.expected_title()),
            AttributeCheck::new(self.selector(), "aria-keyshortcuts", self.expected_shortcuts()),
        ]
    }
}

/// Where the editor lives and what to capture
#[derive(Debug, Clone)]
pub struct EditorTarget {
    pub base_url: String,
    pub path: String,
    /// Value stored under `localStorage.token` to get past the login redirect
    pub token: String,
    pub ready_selector: String,
    pub screenshot: PathBuf,
}

impl Default for EditorTarget {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            path: "/admin/editor".to_string(),
            token: "dummy-token".to_string(),
            ready_selector: ".ProseMirror".to_string(),
            screenshot: PathBuf::from("verification/verification.png"),
        }
    }
}

/// Editor toolbar tooltips and keyboard-shortcut hints
pub fn editor_shortcuts(target: &EditorTarget) -> Scenario {
    let mut steps = vec![
        Step::Navigate {
            url: target.path.clone(),
            wait_for_selector: None,
        },
        Step::Evaluate {
            script: format!(
                "localStorage.setItem('token', {})",
                serde_json::Value::String(target.token.clone())
            ),
        },
        Step::Navigate {
            url: target.path.clone(),
            wait_for_selector: Some(target.ready_selector.clone()),
        },
    ];

    for control in TOOLBAR_CONTROLS {
        steps.extend(control.checks().into_iter().map(Step::ExpectAttribute));
        steps.push(Step::Log {
            message: format!("{} button attributes verified.", control.label),
        });
    }

    // The toolbar is the Bold button's parent element
    steps.push(Step::Screenshot {
        path: target.screenshot.clone(),
        selector: Some(format!("{} >> xpath=..", TOOLBAR_CONTROLS[0].selector())),
        full_page: false,
    });
    steps.push(Step::Log {
        message: "Screenshot taken.".to_string(),
    });

    Scenario {
        name: EDITOR_SHORTCUTS.to_string(),
        description: "Toolbar buttons expose their shortcut in title and aria-keyshortcuts".to_string(),
        tags: vec!["editor".to_string(), "a11y".to_string()],
        base_url: target.base_url.clone(),
        viewport: Viewport { width: 1280, height: 720 },
        steps,
        error_screenshot: None,
    }
}

/// Login page and the password used to exercise the visibility toggle
#[derive(Debug, Clone)]
pub struct LoginTarget {
    pub base_url: String,
    pub path: String,
    pub password: String,
    pub screenshot_dir: PathBuf,
}

impl Default for LoginTarget {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            path: "/login".to_string(),
            password: "mysecretpassword".to_string(),
            screenshot_dir: PathBuf::from("verification"),
        }
    }
}

const PASSWORD_INPUT: &str = r#"input[name="password"]"#;
const SHOW_PASSWORD: &str = r#"button[aria-label="Show password"]"#;
const HIDE_PASSWORD: &str = r#"button[aria-label="Hide password"]"#;

/// Password field flips between masked and plain text and back
pub fn login_password_toggle(target: &LoginTarget) -> Scenario {
    let input_type = |expected: &str, label: &str| {
        Step::ExpectAttribute(AttributeCheck::new(PASSWORD_INPUT, "type", expected).labeled(label))
    };

    let steps = vec![
        Step::Navigate {
            url: target.path.clone(),
            wait_for_selector: Some(PASSWORD_INPUT.to_string()),
        },
        Step::Fill {
            selector: PASSWORD_INPUT.to_string(),
            value: target.password.clone(),
        },
        input_type("password", "Initial type"),
        Step::Screenshot {
            path: target.screenshot_dir.join("1_before_toggle.png"),
            selector: None,
            full_page: false,
        },
        Step::Click {
            selector: SHOW_PASSWORD.to_string(),
            timeout_ms: None,
        },
        input_type("text", "Toggled type"),
        Step::Screenshot {
            path: target.screenshot_dir.join("2_after_toggle.png"),
            selector: None,
            full_page: false,
        },
        Step::Click {
            selector: HIDE_PASSWORD.to_string(),
            timeout_ms: None,
        },
        input_type("password", "Final type"),
    ];

    Scenario {
        name: LOGIN_PASSWORD_TOGGLE.to_string(),
        description: "Show/hide control toggles the password input type".to_string(),
        tags: vec!["auth".to_string(), "a11y".to_string()],
        base_url: target.base_url.clone(),
        viewport: Viewport { width: 1280, height: 720 },
        steps,
        error_screenshot: Some(target.screenshot_dir.join("error.png")),
    }
}

/// Look up a built-in browser scenario by name, built against the given targets
pub fn by_name(name: &str, editor: &EditorTarget, login: &LoginTarget) -> Option<Scenario> {
    match name {
        EDITOR_SHORTCUTS | "editor" => Some(editor_shortcuts(editor)),
        LOGIN_PASSWORD_TOGGLE | "login" => Some(login_password_toggle(login)),
        _ => None,
    }
}
