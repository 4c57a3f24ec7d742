//! Hall notation generator.
//!
//! A Hall symbol lists the lattice centring followed by up to four matrix symbols and an
//! optional origin shift, e.g. `-P 2ac 2n` or `P 31 2c (0 0 1)`. Each matrix symbol is turned
//! into a generator; the generators are then closed into the full operation list.

use log::debug;
use nalgebra::{Matrix3, Vector3};

use super::symmetry_operations::{close_group, SymmetryOperation};
use crate::error::CrystalError;

type Result<T> = std::result::Result<T, CrystalError>;

/// Rotation axis of a Hall matrix symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
    /// Face diagonal `'` relative to a principal axis
    Prime(Principal),
    /// Face diagonal `"` relative to a principal axis
    DoublePrime(Principal),
    /// Body diagonal `*`
    Diagonal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Principal {
    X,
    Y,
    Z,
}

/// One parsed matrix symbol such as `-4bw` or `2"c`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MatrixSymbol {
    improper: bool,
    fold: u8,
    screw: u8,
    axis: Option<char>,
    translation: Vector3<i32>,
}

fn unknown(symbol: &str, reason: &str) -> CrystalError {
    CrystalError::SpacegroupUnknown(format!("{} ({})", symbol, reason))
}

/// Lattice centring translations (in twelfths) for a lattice letter.
pub fn centring_translations(lattice: char) -> Option<Vec<Vector3<i32>>> {
    let vecs = match lattice.to_ascii_uppercase() {
        'P' => vec![],
        'A' => vec![Vector3::new(0, 6, 6)],
        'B' => vec![Vector3::new(6, 0, 6)],
        'C' => vec![Vector3::new(6, 6, 0)],
        'I' => vec![Vector3::new(6, 6, 6)],
        'R' => vec![Vector3::new(8, 4, 4), Vector3::new(4, 8, 8)],
        'F' => vec![
            Vector3::new(0, 6, 6),
            Vector3::new(6, 0, 6),
            Vector3::new(6, 6, 0),
        ],
        _ => return None,
    };
    Some(vecs)
}

fn translation_symbol(letter: char) -> Option<Vector3<i32>> {
    let t = match letter {
        'a' => Vector3::new(6, 0, 0),
        'b' => Vector3::new(0, 6, 0),
        'c' => Vector3::new(0, 0, 6),
        'n' => Vector3::new(6, 6, 6),
        'u' => Vector3::new(3, 0, 0),
        'v' => Vector3::new(0, 3, 0),
        'w' => Vector3::new(0, 0, 3),
        'd' => Vector3::new(3, 3, 3),
        _ => return None,
    };
    Some(t)
}

fn parse_matrix_symbol(token: &str, symbol: &str) -> Result<MatrixSymbol> {
    let mut chars = token.chars().peekable();
    let improper = chars.next_if_eq(&'-').is_some();
    let fold = match chars.next() {
        Some(c @ ('1' | '2' | '3' | '4' | '6')) => c as u8 - b'0',
        _ => return Err(unknown(symbol, "bad rotation order")),
    };
    let mut screw = 0;
    if let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        screw = c as u8 - b'0';
        if screw == 0 || screw >= fold {
            return Err(unknown(symbol, "bad screw component"));
        }
    }
    let axis = chars.next_if(|c| matches!(c, 'x' | 'y' | 'z' | '\'' | '"' | '*'));
    let mut translation = Vector3::zeros();
    for c in chars {
        translation += translation_symbol(c).ok_or_else(|| unknown(symbol, "bad translation symbol"))?;
    }
    Ok(MatrixSymbol {
        improper,
        fold,
        screw,
        axis,
        translation,
    })
}

fn principal_of(axis: Option<Axis>) -> Principal {
    match axis {
        Some(Axis::X) => Principal::X,
        Some(Axis::Y) => Principal::Y,
        _ => Principal::Z,
    }
}

/// Resolves the rotation axis, applying the Hall defaults for omitted axis symbols.
fn infer_axis(
    position: usize,
    current: &MatrixSymbol,
    previous: Option<(u8, Axis)>,
    symbol: &str,
) -> Result<Axis> {
    let reference = principal_of(previous.map(|(_, a)| a));
    match current.axis {
        Some('x') => return Ok(Axis::X),
        Some('y') => return Ok(Axis::Y),
        Some('z') => return Ok(Axis::Z),
        Some('\'') => return Ok(Axis::Prime(reference)),
        Some('"') => return Ok(Axis::DoublePrime(reference)),
        Some('*') => return Ok(Axis::Diagonal),
        _ => {}
    }
    if current.fold == 1 || position == 0 {
        return Ok(Axis::Z);
    }
    match (position, current.fold, previous) {
        (1, 2, Some((2 | 4, _))) => Ok(Axis::X),
        (1, 2, Some((3 | 6, prev))) => Ok(Axis::Prime(principal_of(Some(prev)))),
        (2, 3, _) => Ok(Axis::Diagonal),
        _ => Err(unknown(symbol, "cannot infer rotation axis")),
    }
}

fn rotation_matrix(fold: u8, axis: Axis) -> Option<Matrix3<i32>> {
    #[rustfmt::skip]
    let m = match (axis, fold) {
        (_, 1) => Matrix3::identity(),
        (Axis::X, 2) => Matrix3::new(1, 0, 0, 0, -1, 0, 0, 0, -1),
        (Axis::X, 3) => Matrix3::new(1, 0, 0, 0, 0, -1, 0, 1, -1),
        (Axis::X, 4) => Matrix3::new(1, 0, 0, 0, 0, -1, 0, 1, 0),
        (Axis::X, 6) => Matrix3::new(1, 0, 0, 0, 1, -1, 0, 1, 0),
        (Axis::Y, 2) => Matrix3::new(-1, 0, 0, 0, 1, 0, 0, 0, -1),
        (Axis::Y, 3) => Matrix3::new(-1, 0, 1, 0, 1, 0, -1, 0, 0),
        (Axis::Y, 4) => Matrix3::new(0, 0, 1, 0, 1, 0, -1, 0, 0),
        (Axis::Y, 6) => Matrix3::new(0, 0, 1, 0, 1, 0, -1, 0, 1),
        (Axis::Z, 2) => Matrix3::new(-1, 0, 0, 0, -1, 0, 0, 0, 1),
        (Axis::Z, 3) => Matrix3::new(0, -1, 0, 1, -1, 0, 0, 0, 1),
        (Axis::Z, 4) => Matrix3::new(0, -1, 0, 1, 0, 0, 0, 0, 1),
        (Axis::Z, 6) => Matrix3::new(1, -1, 0, 1, 0, 0, 0, 0, 1),
        (Axis::Prime(Principal::X), 2) => Matrix3::new(-1, 0, 0, 0, 0, -1, 0, -1, 0),
        (Axis::DoublePrime(Principal::X), 2) => Matrix3::new(-1, 0, 0, 0, 0, 1, 0, 1, 0),
        (Axis::Prime(Principal::Y), 2) => Matrix3::new(0, 0, -1, 0, -1, 0, -1, 0, 0),
        (Axis::DoublePrime(Principal::Y), 2) => Matrix3::new(0, 0, 1, 0, -1, 0, 1, 0, 0),
        (Axis::Prime(Principal::Z), 2) => Matrix3::new(0, -1, 0, -1, 0, 0, 0, 0, -1),
        (Axis::DoublePrime(Principal::Z), 2) => Matrix3::new(0, 1, 0, 1, 0, 0, 0, 0, -1),
        (Axis::Diagonal, 3) => Matrix3::new(0, 0, 1, 1, 0, 0, 0, 1, 0),
        _ => return None,
    };
    Some(m)
}

fn screw_translation(fold: u8, screw: u8, axis: Axis) -> Vector3<i32> {
    if screw == 0 {
        return Vector3::zeros();
    }
    let shift = 12 * screw as i32 / fold as i32;
    match axis {
        Axis::X => Vector3::new(shift, 0, 0),
        Axis::Y => Vector3::new(0, shift, 0),
        _ => Vector3::new(0, 0, shift),
    }
}

fn parse_origin_shift(text: &str, symbol: &str) -> Result<Vector3<i32>> {
    let inner = text
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| unknown(symbol, "bad origin shift"))?;
    let values: Vec<i32> = inner
        .split_whitespace()
        .map(|v| v.parse::<i32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| unknown(symbol, "bad origin shift"))?;
    if values.len() != 3 {
        return Err(unknown(symbol, "origin shift needs three components"));
    }
    Ok(Vector3::new(values[0], values[1], values[2]))
}

/// Canonical spelling of a Hall symbol: single spaces, uppercase lattice letter,
/// lowercase matrix symbols; `_` is accepted in place of a space.
pub fn normalize_hall_symbol(symbol: &str) -> String {
    let joined = symbol
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut out = String::with_capacity(joined.len());
    let mut seen_lattice = false;
    for c in joined.chars() {
        if !seen_lattice && c.is_ascii_alphabetic() {
            out.push(c.to_ascii_uppercase());
            seen_lattice = true;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

/// The generators encoded by a Hall symbol, including centring translations and the
/// inversion of centrosymmetric symbols, with the origin shift applied.
pub fn hall_generators(symbol: &str) -> Result<Vec<SymmetryOperation>> {
    let normalized = normalize_hall_symbol(symbol);
    let (main, shift) = match normalized.find('(') {
        Some(p) => (
            &normalized[..p],
            Some(parse_origin_shift(&normalized[p..], symbol)?),
        ),
        None => (normalized.as_str(), None),
    };

    let mut tokens = main.split_whitespace();
    let lattice_token = tokens.next().ok_or_else(|| unknown(symbol, "empty symbol"))?;
    let (centric, lattice) = match lattice_token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, lattice_token),
    };
    let mut lattice_chars = lattice.chars();
    let letter = match (lattice_chars.next(), lattice_chars.next()) {
        (Some(c), None) => c,
        _ => return Err(unknown(symbol, "bad lattice symbol")),
    };
    let centring = centring_translations(letter).ok_or_else(|| unknown(symbol, "bad lattice symbol"))?;

    let mut generators: Vec<SymmetryOperation> = centring
        .into_iter()
        .map(SymmetryOperation::pure_translation)
        .collect();
    if centric {
        generators.push(SymmetryOperation::inversion());
    }

    let mut previous: Option<(u8, Axis)> = None;
    for (position, token) in tokens.enumerate() {
        if position > 3 {
            return Err(unknown(symbol, "too many matrix symbols"));
        }
        let matrix = parse_matrix_symbol(token, symbol)?;
        let axis = infer_axis(position, &matrix, previous, symbol)?;
        let mut rotation =
            rotation_matrix(matrix.fold, axis).ok_or_else(|| unknown(symbol, "unsupported axis"))?;
        if matrix.improper {
            rotation = -rotation;
        }
        let translation = matrix.translation + screw_translation(matrix.fold, matrix.screw, axis);
        generators.push(SymmetryOperation::new(rotation, translation));
        previous = Some((matrix.fold, axis));
    }

    if let Some(v) = shift {
        generators = generators.iter().map(|op| op.with_origin_shift(&v)).collect();
    }
    Ok(generators)
}

/// Full, closed list of symmetry operations for a Hall symbol (identity first).
pub fn operations_from_hall(symbol: &str) -> Result<Vec<SymmetryOperation>> {
    let generators = hall_generators(symbol)?;
    let ops = close_group(&generators).map_err(|_| unknown(symbol, "generators do not close"))?;
    debug!("Hall symbol '{}' expands to {} operations", symbol, ops.len());
    Ok(ops)
}
