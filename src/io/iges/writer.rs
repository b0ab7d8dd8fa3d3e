use std::path::Path;

use tracing::{debug, trace};

use crate::error::{IgesError, Result};

use super::entity::{Entity, Param};
use super::model::{EntityId, IgesModel};
use super::settings::IgesSettings;

/// Data columns of a start/global record.
const TEXT_WIDTH: usize = 72;
/// Data columns of a parameter record.
const PARAM_WIDTH: usize = 64;

/// Serializes an [`IgesModel`] into the fixed-column ASCII form.
#[derive(Debug, Clone, Default)]
pub struct IgesWriter {
    settings: IgesSettings,
}

impl IgesWriter {
    #[must_use]
    pub fn new(settings: IgesSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &IgesSettings {
        &self.settings
    }

    /// Renders the whole file.
    ///
    /// Directory pointers are assigned first, in insertion order, so
    /// parameter data can reference entities added after it.
    ///
    /// # Errors
    ///
    /// Returns [`IgesError::UnresolvedReference`] if an entity points at an
    /// id that is not part of `model`.
    pub fn write(&self, model: &IgesModel) -> Result<String> {
        model.validate()?;
        let pointers = model.directory_pointers();
        debug!(entities = model.len(), units = %self.settings.units, "writing IGES file");

        let mut out = String::new();
        let start = chunk(&self.settings.description, TEXT_WIDTH);
        for (i, line) in start.iter().enumerate() {
            push_record(&mut out, line, 'S', i + 1);
        }

        let global = wrap_tokens(&self.global_tokens(), TEXT_WIDTH);
        for (i, line) in global.iter().enumerate() {
            push_record(&mut out, line, 'G', i + 1);
        }

        let mut directory = Vec::with_capacity(2 * model.len());
        let mut parameters = Vec::new();
        for (k, (_, entity)) in model.iter().enumerate() {
            let de = 2 * k + 1;
            let tokens = parameter_tokens(entity, |id| pointers.get(id).copied())?;
            let lines = wrap_tokens(&tokens, PARAM_WIDTH);
            trace!(
                entity_type = entity.entity_type.code(),
                de,
                lines = lines.len(),
                "formatted parameter data"
            );
            let first = parameters.len() + 1;
            directory.extend(directory_records(entity, first, lines.len()));
            parameters.extend(lines.into_iter().map(|line| format!("{line:<PARAM_WIDTH$} {de:>7}")));
        }
        for (i, line) in directory.iter().enumerate() {
            push_record(&mut out, line, 'D', i + 1);
        }
        for (i, line) in parameters.iter().enumerate() {
            push_record(&mut out, line, 'P', i + 1);
        }

        let terminate = format!(
            "S{:>7}G{:>7}D{:>7}P{:>7}",
            start.len(),
            global.len(),
            directory.len(),
            parameters.len()
        );
        push_record(&mut out, &terminate, 'T', 1);
        Ok(out)
    }

    /// Renders the file and writes it to `path`.
    ///
    /// # Errors
    ///
    /// Fails as [`IgesWriter::write`] does, or with [`IgesError::Io`].
    pub fn write_to_path(&self, model: &IgesModel, path: impl AsRef<Path>) -> Result<()> {
        let text = self.write(model)?;
        std::fs::write(path.as_ref(), text).map_err(IgesError::from)?;
        debug!(path = %path.as_ref().display(), "IGES file written");
        Ok(())
    }

    fn global_tokens(&self) -> Vec<String> {
        let s = &self.settings;
        let values = [
            hollerith(","),
            hollerith(";"),
            hollerith(&s.product_id),
            hollerith(&s.file_name),
            hollerith(&s.system_id),
            hollerith(&s.system_id),
            "32".into(),
            "38".into(),
            "6".into(),
            "308".into(),
            "15".into(),
            hollerith(&s.product_id),
            format_real(1.0),
            s.units.iges_code().to_string(),
            hollerith(s.units.iges_name()),
            "1".into(),
            format_real(1.0),
            hollerith(&s.timestamp),
            format_real(s.resolution),
            format_real(s.max_coordinate),
            hollerith(&s.author),
            hollerith(&s.organization),
            "11".into(),
            "0".into(),
            hollerith(&s.timestamp),
        ];
        terminate_tokens(values.into_iter())
    }
}

/// Appends `,` to every token but the last, which gets `;`.
fn terminate_tokens(values: impl ExactSizeIterator<Item = String>) -> Vec<String> {
    let last = values.len().saturating_sub(1);
    values
        .enumerate()
        .map(|(i, mut v)| {
            v.push(if i == last { ';' } else { ',' });
            v
        })
        .collect()
}

fn parameter_tokens(
    entity: &Entity,
    resolve: impl Fn(EntityId) -> Option<usize>,
) -> Result<Vec<String>> {
    let code = entity.entity_type.code();
    let mut values = Vec::with_capacity(entity.params.len() + 1);
    values.push(code.to_string());
    for param in &entity.params {
        values.push(match param {
            Param::Int(i) => i.to_string(),
            Param::Real(x) => format_real(*x),
            Param::Pointer(id) => resolve(*id)
                .ok_or(IgesError::UnresolvedReference { entity_type: code })?
                .to_string(),
            Param::Str(s) => hollerith(s),
        });
    }
    Ok(terminate_tokens(values.into_iter()))
}

/// The two directory records of one entity.
fn directory_records(entity: &Entity, parameter_start: usize, parameter_lines: usize) -> [String; 2] {
    let a = &entity.attributes;
    let code = entity.entity_type.code();
    let first = format!(
        "{code:>8}{parameter_start:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}",
        a.structure, a.line_font, a.level, a.view, a.transform, a.label_display, a.status
    );
    let label: String = a.label.chars().take(8).collect();
    let second = format!(
        "{code:>8}{:>8}{:>8}{parameter_lines:>8}{:>8}{:>8}{:>8}{label:>8}{:>8}",
        a.line_weight, a.color, a.form, "", "", a.subscript
    );
    [first, second]
}

/// Packs tokens into lines of at most `width` characters. Only a Hollerith
/// string longer than a line is split; any other token that does not fit
/// starts a new line.
fn wrap_tokens(tokens: &[String], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for token in tokens {
        if current.len() + token.len() <= width {
            current.push_str(token);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if token.len() > width && is_hollerith(token) {
            let mut pieces = chunk(token, width);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        } else {
            current.push_str(token);
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cuts `text` into full-width pieces; only the last may be shorter.
fn chunk(text: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while rest.len() > width {
        let cut = floor_char_boundary(rest, width);
        pieces.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    pieces.push(rest.to_string());
    pieces
}

fn is_hollerith(token: &str) -> bool {
    let digits = token.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && token.as_bytes().get(digits) == Some(&b'H')
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    (1..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(index)
}

fn push_record(out: &mut String, data: &str, section: char, sequence: usize) {
    out.push_str(&format!("{data:<TEXT_WIDTH$}{section}{sequence:>7}\n"));
}

/// Hollerith form `nHtext`, where `n` counts characters.
pub(crate) fn hollerith(text: &str) -> String {
    format!("{}H{text}", text.chars().count())
}

/// Shortest round-trip representation with an `E` exponent and an explicit
/// decimal point, e.g. `1.E0`, `-2.5E-3`.
pub(crate) fn format_real(value: f64) -> String {
    let text = format!("{value:e}");
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    if mantissa.contains('.') {
        format!("{mantissa}E{exponent}")
    } else {
        format!("{mantissa}.E{exponent}")
    }
}
