use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{info, warn};
use num_rational::BigRational;

use fracstruct::assignments::Assignments;
use fracstruct::cell::Cell;
use fracstruct::config::Settings;
use fracstruct::fracvector::frac_math::ratio_from_pair;
use fracstruct::fracvector::FracVector;
use fracstruct::phasediagram::{Phase, PhaseDiagram};
use fracstruct::symmetries::Spacegroup;
use fracstruct::{Structure, StructureRequest};

#[derive(Parser)]
#[command(name = "fracstruct")]
#[command(about = "Exact rational crystallography toolkit")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Number of threads to use (default: all available cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a number such as 0.33342(10) and print the simplest fraction within its uncertainty
    Rational {
        value: String,
    },
    /// Resolve a spacegroup identifier (Hall symbol, number, HM or Schoenflies symbol, or operation list)
    Spacegroup {
        identifier: String,

        /// List the symmetry operations
        #[arg(short, long)]
        operations: bool,
    },
    /// Lattice system, Niggli matrix, lengths and angles of a basis given as "a,b,c;d,e,f;g,h,i"
    Cell {
        basis: String,
    },
    /// Atom counts of a transformed prototype cell
    Supercell {
        #[arg(short, long, value_enum, default_value = "rocksalt")]
        prototype: Prototype,

        /// Transformation matrix "a,b,c;d,e,f;g,h,i"
        #[arg(long, conflicts_with = "cubic")]
        transform: Option<String>,

        /// Search for a cubic supercell instead
        #[arg(long)]
        cubic: bool,
    },
    /// Convex hull of phases given as SYMBOL:COUNT,...=ENERGY
    Hull {
        #[arg(required = true)]
        phases: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Prototype {
    /// NaCl in its fcc primitive cell
    Rocksalt,
    /// CsCl in its simple cubic cell
    Cscl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Set thread pool size if specified
    if let Some(threads) = cli.threads {
        #[cfg(feature = "parallel")]
        {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .context("Failed to set thread pool size")?;
            info!("Using {} threads", threads);
        }
        #[cfg(not(feature = "parallel"))]
        {
            warn!("Thread count {} specified but parallel feature not enabled. Ignoring.", threads);
        }
    }

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path).with_context(|| format!("Failed to load settings from {}", path))?,
        None => Settings::default(),
    };

    info!("Starting fracstruct v{}", fracstruct::VERSION);

    match cli.command {
        Commands::Rational { value } => rational(&value),
        Commands::Spacegroup { identifier, operations } => spacegroup(&identifier, operations),
        Commands::Cell { basis } => cell(&basis, &settings),
        Commands::Supercell {
            prototype,
            transform,
            cubic,
        } => supercell(prototype, transform.as_deref(), cubic, &settings),
        Commands::Hull { phases } => hull(&phases),
    }
}

fn parse_matrix(text: &str) -> Result<FracVector> {
    let rows: Vec<Vec<String>> = text
        .split(';')
        .map(|row| row.split(',').map(|v| v.trim().to_string()).collect())
        .collect();
    if rows.len() != 3 || rows.iter().any(|r| r.len() != 3) {
        bail!("expected a 3x3 matrix as \"a,b,c;d,e,f;g,h,i\", got \"{}\"", text);
    }
    FracVector::create(rows).with_context(|| format!("Failed to parse matrix \"{}\"", text))
}

fn rational(value: &str) -> Result<()> {
    let parsed = FracVector::create(value)
        .and_then(|v| v.to_rational())
        .with_context(|| format!("Failed to parse \"{}\"", value))?;
    println!("{}", parsed);
    Ok(())
}

fn spacegroup(identifier: &str, operations: bool) -> Result<()> {
    let sg = Spacegroup::parse(identifier).with_context(|| format!("Failed to resolve \"{}\"", identifier))?;
    println!("number:         {}", sg.number());
    println!("hall symbol:    {}", sg.hall_symbol());
    println!("hm symbol:      {}", sg.hm_symbol());
    println!("schoenflies:    {}", sg.schoenflies_symbol());
    if !sg.setting().is_empty() {
        println!("setting:        {}", sg.setting());
    }
    println!("crystal system: {}", sg.crystal_system().as_str());
    println!("order:          {}", sg.order());
    if operations {
        for op in sg.operations() {
            println!("  {}", op);
        }
    }
    Ok(())
}

fn cell(basis: &str, settings: &Settings) -> Result<()> {
    let basis = parse_matrix(basis)?;
    let cell = Cell::with_precision(basis, &ratio_from_pair(settings.precision)).context("Invalid basis")?;
    println!("lattice system: {}", cell.lattice_system());
    println!("niggli matrix:  {}", cell.niggli_matrix());
    println!("orientation:    {}", cell.orientation());
    println!("volume:         {}", cell.volume());
    println!("lengths:        {}", cell.lengths());
    println!("angles:         {}", cell.angles()?);
    Ok(())
}

fn prototype_structure(prototype: Prototype, settings: &Settings) -> Result<Structure> {
    let (basis, coords) = match prototype {
        Prototype::Rocksalt => (
            FracVector::create(vec![vec!["0", "1/2", "1/2"], vec!["1/2", "0", "1/2"], vec!["1/2", "1/2", "0"]])?,
            ["1/2", "1/2", "1/2"],
        ),
        Prototype::Cscl => (FracVector::eye(3), ["1/2", "1/2", "1/2"]),
    };
    let symbols = match prototype {
        Prototype::Rocksalt => ["Na", "Cl"],
        Prototype::Cscl => ["Cs", "Cl"],
    };
    let request = StructureRequest::new()
        .with_assignments(Assignments::from_symbols(&symbols)?)
        .with_uc_basis(basis)
        .with_uc_coordgroups(vec![FracVector::create([[0, 0, 0]])?, FracVector::create([coords])?]);
    Ok(Structure::create_with_settings(request, settings)?)
}

fn supercell(prototype: Prototype, transform: Option<&str>, cubic: bool, settings: &Settings) -> Result<()> {
    let structure = prototype_structure(prototype, settings)?;
    let result = if cubic {
        structure
            .build_cubic_supercell(Some(settings.supercell_tolerance))
            .context("Cubic supercell search failed")?
    } else {
        let t = match transform {
            Some(text) => parse_matrix(text)?,
            None => FracVector::eye(3).scale(&BigRational::from_integer(2.into())),
        };
        structure.build_supercell(&t).context("Supercell construction failed")?
    };
    println!("basis:   {}", result.uc_basis()?);
    println!("counts:  {:?}", result.uc_counts()?);
    println!("atoms:   {}", result.uc_nbr_atoms()?);
    println!("formula: {}", result.formula()?);
    Ok(())
}

/// Parses `SYMBOL:COUNT,...=ENERGY`; a missing energy places the phase in composition space only.
fn parse_phase(text: &str) -> Result<(Phase, Option<BigRational>)> {
    let (composition, energy) = match text.split_once('=') {
        Some((c, e)) => (c, Some(FracVector::create(e.trim())?.to_rational()?)),
        None => (text, None),
    };
    let mut symbols = Vec::new();
    let mut counts = Vec::new();
    for part in composition.split(',') {
        let (symbol, count) = match part.split_once(':') {
            Some((s, c)) => (s.trim(), FracVector::create(c.trim())?.to_rational()?),
            None => (part.trim(), BigRational::from_integer(1.into())),
        };
        if symbol.is_empty() {
            bail!("empty element symbol in \"{}\"", text);
        }
        symbols.push(symbol.to_string());
        counts.push(count);
    }
    Ok((Phase::new(composition, &symbols, &counts)?, energy))
}

fn hull(phases: &[String]) -> Result<()> {
    let mut pd = PhaseDiagram::new();
    for text in phases {
        let (phase, energy) = parse_phase(text).with_context(|| format!("Failed to parse phase \"{}\"", text))?;
        pd.add_phase(phase, energy);
    }
    let hull = pd.hull().context("Hull construction failed")?;
    println!("coordinates: {}", pd.coord_system().join(" "));
    for (i, phase) in pd.phases().iter().enumerate() {
        let distance = match &hull.hull_distances[i] {
            Some(d) => d.to_string(),
            None => "-".to_string(),
        };
        let on_hull = hull.hull_indices.contains(&i);
        let competing: Vec<&str> = hull.competing_indices[i]
            .iter()
            .map(|&j| pd.phases()[j].id.as_str())
            .collect();
        println!(
            "{:<20} {:<6} distance {:<10} competing [{}]",
            phase.id,
            if on_hull { "hull" } else { "inner" },
            distance,
            competing.join(", ")
        );
    }
    for (a, b) in &hull.phase_lines {
        println!("line {} - {}", pd.phases()[*a].id, pd.phases()[*b].id);
    }
    Ok(())
}
