//! Public types for the visualization module.

/// How each measure is drawn inside a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotKind {
    /// Plain lines.
    Line,
    /// Lines with a marker on every observation (default).
    #[default]
    LinePoints,
}

/// Rendering options for [`super::dots_plot_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub kind: PlotKind,
    /// Locale tag for tick labels, see [`super::util::map_locale`].
    pub locale: String,
    /// Optional figure title drawn above the first panel.
    pub title: Option<String>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            kind: PlotKind::default(),
            locale: "en".into(),
            title: None,
        }
    }
}
