pub struct Keybinding {
    pub keys: &'static str,
    pub description: &'static str,
}

pub struct KeybindingCategory {
    pub name: &'static str,
    pub bindings: &'static [Keybinding],
}

pub const KEYBINDING_CATEGORIES: &[KeybindingCategory] = &[
    KeybindingCategory {
        name: "Spotify",
        bindings: &[
            Keybinding {
                keys: "p / Space",
                description: "Play/pause",
            },
            Keybinding {
                keys: "n",
                description: "Next track",
            },
            Keybinding {
                keys: "b",
                description: "Previous track",
            },
            Keybinding {
                keys: "f",
                description: "Toggle favorite",
            },
            Keybinding {
                keys: "a",
                description: "Open Spotify authorization in browser",
            },
        ],
    },
    KeybindingCategory {
        name: "Refresh",
        bindings: &[
            Keybinding {
                keys: "r",
                description: "Sync Spotify and weather now",
            },
            Keybinding {
                keys: "R",
                description: "Full reload",
            },
        ],
    },
    KeybindingCategory {
        name: "Display",
        bindings: &[
            Keybinding {
                keys: "t",
                description: "Toggle dark/light theme",
            },
            Keybinding {
                keys: "d",
                description: "Toggle debug log",
            },
            Keybinding {
                keys: "c",
                description: "Clear debug log",
            },
        ],
    },
    KeybindingCategory {
        name: "System",
        bindings: &[
            Keybinding {
                keys: "q / Esc",
                description: "Quit",
            },
            Keybinding {
                keys: "?",
                description: "Show this help",
            },
        ],
    },
];

/// Calculate total line count for scrolling bounds
pub fn help_content_height() -> usize {
    let mut count = 2; // Title + empty line
    for category in KEYBINDING_CATEGORIES {
        count += 1; // Category name
        count += category.bindings.len();
        count += 1; // Empty line after category
    }
    count
}
