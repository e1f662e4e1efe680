//! Application state and its text rendering.

use crate::error::PredictError;
use crate::plate::ParsedPlate;
use crate::scale::ScalePositions;
use crate::session::Prediction;
use crate::types::{ApiStatus, HistoryEntry, PricePrediction};
use std::io::{self, Write};

const GROUP_SEPARATOR: char = '\u{a0}';
const SCALE_WIDTH: usize = 41;

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub prediction: PricePrediction,
    pub confidence_percent: u32,
    pub positions: ScalePositions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Empty,
    Loading,
    Result(ResultView),
    Error(String),
}

/// Everything the front end shows, in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub status: ApiStatus,
    pub plate: Option<ParsedPlate>,
    pub view: View,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            status: ApiStatus::Unknown,
            plate: None,
            view: View::Empty,
        }
    }
}

impl AppState {
    pub fn show_loading(&mut self) {
        self.view = View::Loading;
    }

    pub fn show_result(&mut self, result: &Prediction) {
        self.plate = Some(result.plate.clone());
        self.view = View::Result(ResultView {
            prediction: result.prediction.clone(),
            confidence_percent: confidence_percent(result.prediction.confidence),
            positions: result.positions,
        });
    }

    pub fn show_error(&mut self, e: &PredictError) {
        self.view = View::Error(e.to_string());
    }
}

/// Formats a price in roubles with ru-RU digit grouping, e.g. `1 250 000 ₽`.
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() * 2 + 4);
    for (i, d) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(d);
    }
    out.push_str(" ₽");
    out
}

pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence * 100.0).round().max(0.0) as u32
}

pub fn format_plate(plate: &ParsedPlate) -> String {
    format!(
        "{} {} {}{} | {}",
        plate.letter1, plate.digits, plate.letter2, plate.letter3, plate.region
    )
}

pub fn share_text(prediction: &PricePrediction) -> String {
    format!(
        "Plate price {}: {}. {} - {}",
        prediction.number,
        format_price(prediction.predicted_price),
        format_price(prediction.price_range.low),
        format_price(prediction.price_range.high)
    )
}

/// Draws the price scale. The marker is clamped to the bar; the positions
/// themselves are not.
fn scale_bar(positions: &ScalePositions) -> String {
    let span = positions.max_pos - positions.min_pos;
    let fraction = ((positions.predicted_pos - positions.min_pos) / span).max(0.0).min(1.0);
    let marker = (fraction * (SCALE_WIDTH - 1) as f64).round() as usize;
    (0..SCALE_WIDTH)
        .map(|i| {
            if i == marker {
                '▲'
            } else if i == 0 || i == SCALE_WIDTH - 1 {
                '|'
            } else {
                '─'
            }
        })
        .collect()
}

pub fn render<W: Write>(out: &mut W, state: &AppState) -> io::Result<()> {
    if state.status != ApiStatus::Unknown {
        writeln!(out, "API: {}", state.status)?;
    }
    if let Some(plate) = &state.plate {
        writeln!(out, "[{}]", format_plate(plate))?;
    }
    match &state.view {
        View::Empty => {}
        View::Loading => writeln!(out, "Predicting...")?,
        View::Error(msg) => writeln!(out, "Error: {}", msg)?,
        View::Result(result) => {
            let p = &result.prediction;
            let low = format_price(p.price_range.low);
            let high = format_price(p.price_range.high);
            writeln!(out, "Predicted price: {}", format_price(p.predicted_price))?;
            writeln!(out, "Range: {} - {}", low, high)?;
            writeln!(out, "Confidence: {}%", result.confidence_percent)?;
            writeln!(out, "{}", scale_bar(&result.positions))?;
            let gap = SCALE_WIDTH.saturating_sub(low.chars().count() + high.chars().count());
            writeln!(out, "{}{:gap$}{}", low, "", high, gap = gap.max(1))?;
        }
    }
    Ok(())
}

pub fn render_history<W: Write>(out: &mut W, entries: &[HistoryEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "History is empty");
    }
    for (i, entry) in entries.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:<10} {:>16}  {}",
            i,
            entry.number,
            format_price(entry.price),
            entry.timestamp.format("%Y-%m-%d %H:%M")
        )?;
    }
    Ok(())
}
