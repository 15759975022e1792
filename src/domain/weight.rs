//! Heat and color mapping.
//!
//! Time counts twice as much as call frequency: a node is "hot" when it is
//! expensive, not merely when it is called a lot.

use std::fmt;

/// Value component for nodes.
pub const NODE_VALUE: f64 = 0.9;
/// Value component for edges, muted so nodes stand out.
pub const EDGE_VALUE: f64 = 0.7;

/// A color in Graphviz HSV notation (all components in [0,1]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    /// Convert to an `#rrggbb` string, for consumers that do not speak HSV.
    pub fn to_rgb_hex(&self) -> String {
        let h = (self.h.clamp(0.0, 1.0) * 6.0) % 6.0;
        let s = self.s.clamp(0.0, 1.0);
        let v = self.v.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_byte = |channel: f64| ((channel + m) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
    }
}

impl fmt::Display for Hsv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} {:.6} {:.6}", self.h, self.s, self.v)
    }
}

/// Combined heat of a call fraction and a time fraction.
pub fn heat(calls_frac: f64, time_frac: f64) -> f64 {
    (time_frac * 2.0 + calls_frac) / 3.0
}

pub fn node_color(calls_frac: f64, time_frac: f64) -> Hsv {
    colorize(calls_frac, time_frac, NODE_VALUE)
}

pub fn edge_color(calls_frac: f64, time_frac: f64) -> Hsv {
    colorize(calls_frac, time_frac, EDGE_VALUE)
}

fn colorize(calls_frac: f64, time_frac: f64, value: f64) -> Hsv {
    let heat = heat(calls_frac, time_frac);
    Hsv {
        h: heat / 2.0 + 0.5,
        s: heat,
        v: value,
    }
}
