use eframe::egui::Color32;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub muted: Color32,
    pub faint: Color32,
    pub sun: Color32,
    pub moon: Color32,
    pub star: Color32,
    pub sentence_size: f32,
    pub reflection_size: f32,
    pub keyword_size: f32,
    pub label_size: f32,
}

impl Theme {
    pub fn night() -> Self {
        Self {
            name: "night".to_string(),
            background: Color32::from_rgb(0x05, 0x05, 0x05),
            foreground: Color32::from_rgb(0xE4, 0xE4, 0xE7),
            heading_color: Color32::from_rgb(0xF4, 0xF4, 0xF5),
            accent: Color32::from_rgb(0xF5, 0x9E, 0x0B),
            muted: Color32::from_rgb(0x71, 0x71, 0x7A),
            faint: Color32::from_rgb(0x27, 0x27, 0x2A),
            sun: Color32::WHITE,
            moon: Color32::from_rgb(0x05, 0x05, 0x05),
            star: Color32::from_rgb(0xE4, 0xE4, 0xE7),
            sentence_size: 54.0,
            reflection_size: 24.0,
            keyword_size: 14.0,
            label_size: 13.0,
        }
    }

    pub fn dawn() -> Self {
        Self {
            name: "dawn".to_string(),
            background: Color32::from_rgb(0xF6, 0xF1, 0xE7),
            foreground: Color32::from_rgb(0x2A, 0x26, 0x20),
            heading_color: Color32::from_rgb(0x1C, 0x19, 0x15),
            accent: Color32::from_rgb(0xB4, 0x6A, 0x00),
            muted: Color32::from_rgb(0x8A, 0x82, 0x74),
            faint: Color32::from_rgb(0xDD, 0xD4, 0xC4),
            sun: Color32::from_rgb(0xFF, 0xF8, 0xEA),
            moon: Color32::from_rgb(0x26, 0x22, 0x33),
            star: Color32::from_rgb(0xB4, 0x6A, 0x00),
            sentence_size: 54.0,
            reflection_size: 24.0,
            keyword_size: 14.0,
            label_size: 13.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dawn" => Self::dawn(),
            _ => Self::night(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "night" {
            Self::dawn()
        } else {
            Self::night()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }

    /// Warm corona color between the sun's core white and the accent gold.
    pub fn corona(&self, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        Color32::from_rgb(
            lerp(self.sun.r(), self.accent.r()),
            lerp(self.sun.g(), self.accent.g()),
            lerp(self.sun.b(), self.accent.b()),
        )
    }
}
