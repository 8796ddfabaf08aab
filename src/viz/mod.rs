//! Visualization of DOTS results: one panel per counterpart, rendered to
//! **SVG** or **PNG** (picked from the output file extension).
//!
//! - One stacked panel per counterpart, captioned `Home: <country>, Foreign: <counterpart>`
//! - Shared period axis across panels, each panel with its own value axis
//! - Fixed color per measure (Microsoft Office palette)
//! - Locale-aware tick labels (`30,000` vs `30.000`)

pub mod text;
pub mod types;
pub mod util;

pub use types::{PlotKind, PlotOptions};

use crate::error::{Error, Result};
use crate::table::{TradeRow, TradeTable, Variable};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::path::Path;
use std::sync::Once;

use text::truncate_to_width;
use util::{choose_axis_scale, compute_left_label_area_px, format_tick, map_locale, variable_color};

/// Measures drawn when the caller does not choose.
pub const DEFAULT_SUBSET: [Variable; 3] = [
    Variable::Exports,
    Variable::Imports,
    Variable::TradeBalance,
];

const MARGIN: u32 = 12;
const CAPTION_PX: u32 = 18;
const TITLE_PX: u32 = 26;

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

/// Plot `subset` of a long-form DOTS table with the default locale (`"en"`).
pub fn dots_plot<P: AsRef<Path>>(
    table: &TradeTable,
    subset: &[Variable],
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    dots_plot_with(table, subset, out_path, width, height, &PlotOptions::default())
}

/// Same as [`dots_plot`], with tick labels formatted for `locale_tag`.
pub fn dots_plot_locale<P: AsRef<Path>>(
    table: &TradeTable,
    subset: &[Variable],
    out_path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<()> {
    let opts = PlotOptions {
        locale: locale_tag.to_string(),
        ..PlotOptions::default()
    };
    dots_plot_with(table, subset, out_path, width, height, &opts)
}

/// Render the figure.
///
/// Fails with [`Error::InvalidInput`] when the table is wide, empty, has
/// more than one home country, or `subset` is empty; nothing is written in
/// that case. Backend failures come back as [`Error::Render`].
pub fn dots_plot_with<P: AsRef<Path>>(
    table: &TradeTable,
    subset: &[Variable],
    out_path: P,
    width: u32,
    height: u32,
    opts: &PlotOptions,
) -> Result<()> {
    let rows = validate_plot_input(table, subset)?;
    let country = rows[0].country.as_str();

    let mut groups: BTreeMap<&str, Vec<(f64, &TradeRow)>> = BTreeMap::new();
    for r in rows {
        let x = period_to_x(&r.period)?;
        groups.entry(r.counterpart.as_str()).or_default().push((x, r));
    }
    for series in groups.values_mut() {
        series.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    let monthly = rows.iter().any(|r| r.period.contains('-'));
    let step = if monthly { 1.0 / 12.0 } else { 1.0 };
    let xs = groups.values().flatten().map(|(x, _)| *x);
    let (mut x_min, mut x_max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= step;
        x_max += step;
    }

    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    log::debug!(
        "plotting {} panel(s) for {} to {}",
        groups.len(),
        country,
        path_string
    );

    let figure = Figure {
        country,
        groups,
        subset,
        x_range: (x_min, x_max),
        monthly,
        opts,
    };

    let is_svg = out_path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_figure(root, &figure)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_figure(root, &figure)?;
    }
    Ok(())
}

fn validate_plot_input<'a>(table: &'a TradeTable, subset: &[Variable]) -> Result<&'a [TradeRow]> {
    if subset.is_empty() {
        return Err(Error::invalid(
            "subset must name at least one of 'Exports', 'Imports', 'Trade Balance', 'Twoway Trade'",
        ));
    }
    let rows = table.as_long().ok_or_else(|| {
        Error::invalid("wrong data form: plotting needs long-form data (Form::Long)")
    })?;
    if rows.is_empty() {
        return Err(Error::invalid("no data to plot"));
    }
    let countries: BTreeSet<&str> = rows.iter().map(|r| r.country.as_str()).collect();
    if countries.len() != 1 {
        return Err(Error::invalid(format!(
            "non-unique origin countries detected: {}",
            countries.into_iter().collect::<Vec<_>>().join(", ")
        )));
    }
    Ok(rows)
}

/// `2003` -> 2003.0, `2003-04` -> 2003.25.
fn period_to_x(period: &str) -> Result<f64> {
    let bad = || Error::invalid(format!("unrecognised period {period:?}"));
    let (year, month) = match period.split_once('-') {
        Some((y, m)) => (y, Some(m)),
        None => (period, None),
    };
    let year: i32 = year.trim().parse().map_err(|_| bad())?;
    let month: u32 = match month {
        Some(m) => m.trim().parse().map_err(|_| bad())?,
        None => 1,
    };
    if !(1..=12).contains(&month) {
        return Err(bad());
    }
    Ok(year as f64 + (month - 1) as f64 / 12.0)
}

fn x_label(x: f64, monthly: bool) -> String {
    if !monthly {
        return format!("{}", x.round() as i64);
    }
    let year = x.floor();
    let month = (((x - year) * 12.0).round() as i64 + 1).clamp(1, 12);
    format!("{}-{:02}", year as i64, month)
}

fn render_err<E: Debug>(e: E) -> Error {
    Error::Render(format!("{e:?}"))
}

struct Figure<'a> {
    country: &'a str,
    groups: BTreeMap<&'a str, Vec<(f64, &'a TradeRow)>>,
    subset: &'a [Variable],
    x_range: (f64, f64),
    monthly: bool,
    opts: &'a PlotOptions,
}

fn draw_figure<DB>(root: DrawingArea<DB, Shift>, figure: &Figure<'_>) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(render_err)?;

    let body = match figure.opts.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => {
            let (w, _) = root.dim_in_pixel();
            let title = truncate_to_width(t, TITLE_PX, w.saturating_sub(2 * MARGIN));
            root.titled(&title, (FontFamily::SansSerif, TITLE_PX))
                .map_err(render_err)?
        }
        _ => root.clone(),
    };

    let panels = body.split_evenly((figure.groups.len(), 1));
    for (area, (counterpart, series)) in panels.iter().zip(figure.groups.iter()) {
        draw_panel(area, figure, counterpart, series)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    figure: &Figure<'_>,
    counterpart: &str,
    series: &[(f64, &TradeRow)],
) -> Result<()>
where
    DB: DrawingBackend,
{
    let values: Vec<f64> = series
        .iter()
        .flat_map(|(_, r)| figure.subset.iter().map(move |v| v.of(r)))
        .filter(|v| v.is_finite())
        .collect();
    let (mut min_val, mut max_val) = (
        values.iter().cloned().fold(f64::INFINITY, f64::min),
        values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );
    if values.is_empty() {
        min_val = 0.0;
        max_val = 1.0;
    }
    if (max_val - min_val).abs() < f64::EPSILON {
        min_val -= 1.0;
        max_val += 1.0;
    }

    let max_abs = min_val.abs().max(max_val.abs());
    let (yscale, scale_word) = choose_axis_scale(max_abs);
    let y_desc = if scale_word.is_empty() {
        "Value".to_string()
    } else {
        format!("Value ({scale_word})")
    };

    let (num_locale, dec_sep) = map_locale(&figure.opts.locale);
    let y_fmt = |v: &f64| format_tick(*v, num_locale, dec_sep);
    let x_fmt = |x: &f64| x_label(*x, figure.monthly);

    let y_label_count = 6;
    let left_px = compute_left_label_area_px(
        min_val / yscale,
        max_val / yscale,
        y_label_count,
        12,
        |v| format_tick(v, num_locale, dec_sep),
    );
    let (x_min, x_max) = figure.x_range;
    let x_label_count = if figure.monthly {
        10
    } else {
        ((x_max - x_min).round() as usize + 1).clamp(2, 12)
    };

    let (w, _) = area.dim_in_pixel();
    let caption = truncate_to_width(
        &format!("Home: {}, Foreign: {}", figure.country, counterpart),
        CAPTION_PX,
        w.saturating_sub(2 * MARGIN),
    );

    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .caption(caption, (FontFamily::SansSerif, CAPTION_PX))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_min..x_max, (min_val / yscale)..(max_val / yscale))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Period")
        .y_desc(y_desc)
        .x_labels(x_label_count)
        .y_labels(y_label_count)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(render_err)?;

    for variable in figure.subset {
        let color = variable_color(*variable);
        let points: Vec<(f64, f64)> = series
            .iter()
            .map(|(x, r)| (*x, variable.of(r) / yscale))
            .filter(|(_, y)| y.is_finite())
            .collect();
        let style = ShapeStyle {
            color,
            filled: false,
            stroke_width: 2,
        };
        chart
            .draw_series(LineSeries::new(points.clone(), style))
            .map_err(render_err)?
            .label(variable.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        if figure.opts.kind == PlotKind::LinePoints {
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|(x, y)| Circle::new((*x, *y), 3, color.filled())),
                )
                .map_err(render_err)?;
        }
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .label_font((FontFamily::SansSerif, 12))
        .draw()
        .map_err(render_err)?;
    Ok(())
}
