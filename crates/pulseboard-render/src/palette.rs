//! Deterministic visual derivations.
//!
//! Every color on screen is a pure function of domain data: the activity
//! kind picks the particle color, the node's stable palette index picks
//! the actor color. No randomness here -- two renders of the same state
//! produce identical frames.

use pulseboard_types::ActivityKind;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Near-white, used for text and the focal marker.
pub const FOREGROUND: Color = Color::new(0xe8, 0xea, 0xf0);

/// Dim slate, used for ambient decoration.
pub const AMBIENT: Color = Color::new(0x2a, 0x2f, 0x3e);

/// Actor node palette, indexed by each node's stable color index.
const NODE_PALETTE: [Color; 8] = [
    Color::new(0x4f, 0xc3, 0xf7), // sky
    Color::new(0xba, 0x68, 0xc8), // orchid
    Color::new(0x81, 0xc7, 0x84), // sage
    Color::new(0xff, 0xb7, 0x4d), // amber
    Color::new(0xe5, 0x73, 0x73), // coral
    Color::new(0x64, 0xb5, 0xf6), // cornflower
    Color::new(0xff, 0xd5, 0x4f), // gold
    Color::new(0x4d, 0xb6, 0xac), // teal
];

/// The particle color for an activity kind.
pub const fn kind_color(kind: ActivityKind) -> Color {
    match kind {
        ActivityKind::TaskCreated => Color::new(0x66, 0xbb, 0x6a),
        ActivityKind::TaskUpdated => Color::new(0x42, 0xa5, 0xf5),
        ActivityKind::StatusChanged => Color::new(0xab, 0x47, 0xbc),
        ActivityKind::MessageSent => Color::new(0x26, 0xc6, 0xda),
        ActivityKind::ApprovalRequested => Color::new(0xff, 0xa7, 0x26),
        ActivityKind::ApprovalDecided => Color::new(0xd4, 0xe1, 0x57),
        ActivityKind::BroadcastSent => Color::new(0xec, 0x40, 0x7a),
        ActivityKind::UserAssigned => Color::new(0x7e, 0x57, 0xc2),
    }
}

/// The actor color for a node's stable palette index (wraps).
pub fn node_color(color_index: usize) -> Color {
    let index = color_index % NODE_PALETTE.len();
    NODE_PALETTE.get(index).copied().unwrap_or(FOREGROUND)
}
