use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{IgesError, Result};
use crate::geometry::{KnotVector, SplineCurve, SplineSurface};
use crate::math::Point3;

use super::entity::EntityType;

const PARAM_WIDTH: usize = 64;

/// One entity recovered from the directory and parameter sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntity {
    pub entity_type: u16,
    pub form: i32,
    /// Raw parameter tokens after the type code. Hollerith strings are
    /// decoded; omitted values are empty.
    pub params: Vec<String>,
}

impl ParsedEntity {
    fn token(&self, index: usize) -> Result<&str> {
        self.params.get(index).map(String::as_str).ok_or_else(|| {
            parse_error(format!(
                "entity {} has {} parameters, index {index} requested",
                self.entity_type,
                self.params.len()
            ))
        })
    }

    /// Parameter `index` as a real. Fortran `D` exponents are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`IgesError::Parse`] if the parameter is missing or not a number.
    pub fn real(&self, index: usize) -> Result<f64> {
        let token = self.token(index)?;
        if token.is_empty() {
            return Ok(0.0);
        }
        token
            .replace(['D', 'd'], "E")
            .parse()
            .map_err(|_| parse_error(format!("{token:?} is not a real number")))
    }

    /// Parameter `index` as an integer.
    ///
    /// # Errors
    ///
    /// Returns [`IgesError::Parse`] if the parameter is missing or not an
    /// integer.
    pub fn int(&self, index: usize) -> Result<i64> {
        let token = self.token(index)?;
        if token.is_empty() {
            return Ok(0);
        }
        token
            .parse()
            .map_err(|_| parse_error(format!("{token:?} is not an integer")))
    }

    fn count(&self, index: usize) -> Result<usize> {
        let value = self.int(index)?;
        usize::try_from(value).map_err(|_| parse_error(format!("negative count {value}")))
    }

    /// Every parameter as a real.
    ///
    /// # Errors
    ///
    /// Returns [`IgesError::Parse`] on the first non-numeric parameter.
    pub fn reals(&self) -> Result<Vec<f64>> {
        (0..self.params.len()).map(|i| self.real(i)).collect()
    }

    /// Every parameter as an integer.
    ///
    /// # Errors
    ///
    /// Returns [`IgesError::Parse`] on the first non-integer parameter.
    pub fn ints(&self) -> Result<Vec<i64>> {
        (0..self.params.len()).map(|i| self.int(i)).collect()
    }

    fn reals_from(&self, start: usize, count: usize) -> Result<Vec<f64>> {
        (start..start + count).map(|i| self.real(i)).collect()
    }

    fn expect_type(&self, expected: EntityType) -> Result<()> {
        if self.entity_type == expected.code() {
            Ok(())
        } else {
            Err(parse_error(format!(
                "expected entity type {}, found {}",
                expected.code(),
                self.entity_type
            )))
        }
    }
}

fn parse_error(message: String) -> crate::PatchworkError {
    IgesError::Parse(message).into()
}

/// Reads every entity of an IGES file, in directory order.
///
/// # Errors
///
/// Returns [`IgesError::Parse`] if the directory or parameter sections are
/// malformed.
pub fn read_entities(text: &str) -> Result<Vec<ParsedEntity>> {
    let mut directory = Vec::new();
    let mut parameters = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let Some(section) = line.get(72..73) else {
            if line.trim().is_empty() {
                continue;
            }
            return Err(parse_error(format!("line {} is shorter than 73 columns", number + 1)));
        };
        match section {
            "D" => directory.push(&line[..72]),
            "P" => parameters.push(line),
            _ => {}
        }
    }
    if directory.len() % 2 != 0 {
        return Err(parse_error("directory section has an odd number of records".into()));
    }

    let mut entities = Vec::with_capacity(directory.len() / 2);
    for (k, pair) in directory.chunks(2).enumerate() {
        let entity_type: u16 = field(pair[0], 0)?;
        let start: usize = field(pair[0], 1)?;
        let line_count: usize = field(pair[1], 3)?;
        let form: i32 = field(pair[1], 4)?;
        let lines = start
            .checked_sub(1)
            .and_then(|first| parameters.get(first..first + line_count))
            .ok_or_else(|| {
                parse_error(format!(
                    "entity {entity_type} at DE {} points outside the parameter section",
                    2 * k + 1
                ))
            })?;
        let data: String = lines
            .iter()
            .map(|&line| line.get(..PARAM_WIDTH).unwrap_or(line))
            .collect();
        let mut tokens = tokenize(&data)?;
        if tokens.is_empty() || tokens.remove(0).parse::<u16>().ok() != Some(entity_type) {
            return Err(parse_error(format!(
                "parameter data of DE {} does not start with type {entity_type}",
                2 * k + 1
            )));
        }
        entities.push(ParsedEntity {
            entity_type,
            form,
            params: tokens,
        });
    }
    debug!(entities = entities.len(), "read IGES entities");
    Ok(entities)
}

/// Counts entities per type code.
///
/// # Errors
///
/// Fails as [`read_entities`] does.
pub fn entity_census(text: &str) -> Result<BTreeMap<u16, usize>> {
    let mut census = BTreeMap::new();
    for entity in read_entities(text)? {
        *census.entry(entity.entity_type).or_insert(0) += 1;
    }
    Ok(census)
}

/// The `index`-th 8-column field of a directory record.
fn field<T: std::str::FromStr>(record: &str, index: usize) -> Result<T> {
    let raw = record.get(index * 8..index * 8 + 8).unwrap_or("").trim();
    let raw = if raw.is_empty() { "0" } else { raw };
    raw.parse()
        .map_err(|_| parse_error(format!("directory field {} is {raw:?}", index + 1)))
}

/// Splits free-format parameter data at `,` up to the terminating `;`.
fn tokenize(data: &str) -> Result<Vec<String>> {
    let chars: Vec<char> = data.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    loop {
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        let digits = chars[i..].iter().take_while(|c| c.is_ascii_digit()).count();
        let token = if digits > 0 && chars.get(i + digits) == Some(&'H') {
            let len: usize = chars[i..i + digits]
                .iter()
                .collect::<String>()
                .parse()
                .map_err(|_| parse_error("bad Hollerith length".into()))?;
            let begin = i + digits + 1;
            let text = chars
                .get(begin..begin + len)
                .ok_or_else(|| parse_error("Hollerith string runs past the data".into()))?;
            i = begin + len;
            while i < chars.len() && chars[i] == ' ' {
                i += 1;
            }
            text.iter().collect::<String>()
        } else {
            let end = chars[i..]
                .iter()
                .position(|c| *c == ',' || *c == ';')
                .map_or(chars.len(), |p| i + p);
            let text: String = chars[i..end].iter().collect();
            i = end;
            text.trim().to_string()
        };
        tokens.push(token);
        match chars.get(i) {
            Some(',') => i += 1,
            Some(';') => return Ok(tokens),
            _ => return Err(parse_error("parameter data is not terminated by ';'".into())),
        }
    }
}

impl SplineCurve {
    /// Rebuilds a curve from a type 126 record.
    ///
    /// Single-span curves on `[0, 1]` come back as Bézier forms; the
    /// polynomial flag decides rationality.
    ///
    /// # Errors
    ///
    /// Returns [`IgesError::Parse`] for a malformed record, or a geometry
    /// error if the data does not describe a valid curve.
    pub fn from_parsed(entity: &ParsedEntity) -> Result<Self> {
        entity.expect_type(EntityType::RationalBSplineCurve)?;
        let n = entity.count(0)? + 1;
        let degree = entity.count(1)?;
        let polynomial = entity.int(4)? == 1;
        let knots_at = 6;
        let knot_count = n + degree + 1;
        let weights_at = knots_at + knot_count;
        let points_at = weights_at + n;

        let knots = entity.reals_from(knots_at, knot_count)?;
        let weights = entity.reals_from(weights_at, n)?;
        let coords = entity.reals_from(points_at, 3 * n)?;
        let points = coords
            .chunks(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();

        let curve = if is_bezier_knots(&knots, degree) {
            if polynomial {
                Self::bezier(points)?
            } else {
                Self::rational_bezier(points, weights)?
            }
        } else if polynomial {
            Self::bspline(points, knots, degree)?
        } else {
            Self::nurbs(points, weights, knots, degree)?
        };
        Ok(curve)
    }
}

impl SplineSurface {
    /// Rebuilds a surface from a type 128 record (grids stored v-outer,
    /// u-inner).
    ///
    /// # Errors
    ///
    /// Returns [`IgesError::Parse`] for a malformed record, or a geometry
    /// error if the data does not describe a valid surface.
    pub fn from_parsed(entity: &ParsedEntity) -> Result<Self> {
        entity.expect_type(EntityType::RationalBSplineSurface)?;
        let rows = entity.count(0)? + 1;
        let cols = entity.count(1)? + 1;
        let degree_u = entity.count(2)?;
        let degree_v = entity.count(3)?;
        let polynomial = entity.int(6)? == 1;
        let knots_u_at = 9;
        let knots_v_at = knots_u_at + rows + degree_u + 1;
        let weights_at = knots_v_at + cols + degree_v + 1;
        let points_at = weights_at + rows * cols;

        let knots_u = entity.reals_from(knots_u_at, rows + degree_u + 1)?;
        let knots_v = entity.reals_from(knots_v_at, cols + degree_v + 1)?;
        let flat_weights = entity.reals_from(weights_at, rows * cols)?;
        let coords = entity.reals_from(points_at, 3 * rows * cols)?;

        let mut grid = vec![vec![Point3::origin(); cols]; rows];
        let mut weights = vec![vec![1.0; cols]; rows];
        for j in 0..cols {
            for i in 0..rows {
                let k = j * rows + i;
                grid[i][j] = Point3::new(coords[3 * k], coords[3 * k + 1], coords[3 * k + 2]);
                weights[i][j] = flat_weights[k];
            }
        }

        let bezier = is_bezier_knots(&knots_u, degree_u) && is_bezier_knots(&knots_v, degree_v);
        let surface = match (bezier, polynomial) {
            (true, true) => Self::bezier(grid)?,
            (true, false) => Self::rational_bezier(grid, weights)?,
            (false, true) => Self::bspline(grid, knots_u, knots_v, degree_u, degree_v)?,
            (false, false) => Self::nurbs(grid, weights, knots_u, knots_v, degree_u, degree_v)?,
        };
        Ok(surface)
    }
}

fn is_bezier_knots(knots: &[f64], degree: usize) -> bool {
    KnotVector::bezier(degree).as_slice() == knots
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Curve;
    use crate::io::iges::{IgesModel, IgesWriter, ToIges};
    use crate::PatchworkError;

    #[test]
    fn tokenizer_handles_hollerith_and_defaults() {
        let tokens = tokenize("126,3Ha,b,,  2.5D1 ;").unwrap();
        assert_eq!(tokens, vec!["126", "a,b", "", "2.5D1"]);
        let entity = ParsedEntity {
            entity_type: 126,
            form: 0,
            params: tokens[1..].to_vec(),
        };
        assert_eq!(entity.real(2).unwrap(), 25.0);
        assert_eq!(entity.int(1).unwrap(), 0);
        assert!(entity.real(0).is_err());
    }

    #[test]
    fn unterminated_data_is_rejected() {
        assert!(matches!(
            tokenize("110,0.,0.,0.").unwrap_err(),
            PatchworkError::Iges(IgesError::Parse(_))
        ));
    }

    #[test]
    fn short_lines_are_rejected() {
        assert!(read_entities("116,0.,0.,0.;").is_err());
    }

    #[test]
    fn rational_curve_survives_a_file() {
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let arc = SplineCurve::rational_bezier(
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![1.0, w, 1.0],
        )
        .unwrap();
        let mut model = IgesModel::new();
        arc.to_entities(&mut model).unwrap();
        let text = IgesWriter::default().write(&model).unwrap();
        let parsed = read_entities(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        let back = SplineCurve::from_parsed(&parsed[0]).unwrap();
        assert_eq!(back.form(), arc.form());
        assert_eq!(back.weights(), arc.weights());
        assert_eq!(back.control_points(), arc.control_points());
        assert_eq!(back.evaluate(0.3).unwrap(), arc.evaluate(0.3).unwrap());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let entity = ParsedEntity {
            entity_type: 110,
            form: 0,
            params: vec!["0.".into(); 6],
        };
        assert!(SplineSurface::from_parsed(&entity).is_err());
    }
}
