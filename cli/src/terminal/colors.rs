use colored::Color;

pub const ACCENT: Color = Color::TrueColor { r: 250, g: 200, b: 90 };
pub const SEPARATOR: Color = Color::TrueColor { r: 110, g: 110, b: 120 };
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 220, g: 220, b: 225 };
pub const IPV4_ADDR: Color = Color::TrueColor { r: 110, g: 180, b: 250 };
pub const DEAD: Color = Color::TrueColor { r: 200, g: 90, b: 90 };
