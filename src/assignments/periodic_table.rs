use crate::error::CrystalError;

type Result<T> = std::result::Result<T, CrystalError>;

/// Element symbols indexed by atomic number minus one.
pub const ELEMENT_SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", // 1-10
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca", // 11-20
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", // 21-30
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", // 31-40
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", // 41-50
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", // 51-60
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", // 61-70
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", // 71-80
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", // 81-90
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", // 91-100
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", // 101-110
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og", // 111-118
];

pub fn atomic_symbol(atomic_number: u8) -> Result<&'static str> {
    ELEMENT_SYMBOLS
        .get(usize::from(atomic_number).wrapping_sub(1))
        .copied()
        .ok_or_else(|| CrystalError::structure(format!("no element with atomic number {}", atomic_number)))
}

/// Atomic number of an element symbol (case-insensitive) or of a decimal atomic number.
pub fn atomic_number(symbol: &str) -> Result<u8> {
    let symbol = symbol.trim();
    if let Ok(z) = symbol.parse::<u8>() {
        atomic_symbol(z)?;
        return Ok(z);
    }
    ELEMENT_SYMBOLS
        .iter()
        .position(|s| s.eq_ignore_ascii_case(symbol))
        .map(|i| (i + 1) as u8)
        .ok_or_else(|| CrystalError::structure(format!("unknown element symbol '{}'", symbol)))
}
