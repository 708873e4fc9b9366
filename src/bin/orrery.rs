//! Orrery command line tool
//!
//! Loads the catalog documents and answers position, orientation and star
//! queries at a single instant.
//!
//! Usage:
//!   orrery -i catalog.xml -t 2024-03-20T03:06:00Z position Earth Moon
//!   orrery --json star Mizar
//!   orrery tree

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;

use orrery::catalogs::{Catalog, Named};
use orrery::hierarchy::Hierarchy;
use orrery::time::{parse_epoch, JulianDate};
use orrery::{Ephemeris, EphemerisConfig, Loader};

/// Catalog-driven ephemeris queries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog document (XML or JSON, optionally .gz); repeatable, later files win
    #[arg(short, long, global = true)]
    input: Vec<PathBuf>,

    /// Skip the system and ~/.orrery catalog locations
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    no_default_catalogs: bool,

    /// Query instant as an ISO-8601 date or date-time (default: now)
    #[arg(short, long, global = true)]
    time: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    json: bool,

    /// JSON file with solver and stellar epoch settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Body positions in km, root frame and relative to the parent
    Position { bodies: Vec<String> },
    /// Pole direction and prime meridian angle
    Orientation { bodies: Vec<String> },
    /// Star positions after proper motion
    Star { names: Vec<String> },
    /// Catalog entry of a body or star
    Show { objects: Vec<String> },
    /// Print the body hierarchy
    Tree,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn read_config(path: Option<&PathBuf>) -> Result<EphemerisConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(EphemerisConfig::default()),
    }
}

fn query_time(text: Option<&str>) -> Result<JulianDate> {
    match text {
        Some(_) => Ok(parse_epoch(text)?),
        None => Ok(JulianDate::now()),
    }
}

fn print_position(eph: &Ephemeris, name: &str, t: JulianDate, as_json: bool) -> Result<()> {
    let id = eph.body_id(name)?;
    let body = eph.body(id);
    let absolute = eph.position(id, t)?;
    let relative = eph.relative_position(id, t)?;
    let state = eph.orbit_state(id, t)?;

    if as_json {
        let value = json!({
            "name": body.name,
            "parent": body.parent,
            "time": t.to_iso(),
            "jd": t.jd(),
            "position_km": absolute,
            "relative_km": relative,
            "state": state,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}    {}", body.name, t);
    println!(
        "  Position:  ({:.3}, {:.3}, {:.3}) km",
        absolute.x, absolute.y, absolute.z
    );
    if let (Some(parent), Some(state)) = (&body.parent, state) {
        println!(
            "  From {}:  ({:.3}, {:.3}, {:.3}) km at {:.3} km",
            parent, relative.x, relative.y, relative.z, state.radius
        );
        println!(
            "  Anomalies (mean, true):  {:.6} , {:.6} deg",
            state.mean_anomaly.to_degrees(),
            state.true_anomaly.to_degrees()
        );
    }
    Ok(())
}

fn print_orientation(eph: &Ephemeris, name: &str, t: JulianDate, as_json: bool) -> Result<()> {
    let orientation = eph.orientation_of(name, t)?;
    let body = eph.body(eph.body_id(name)?);

    if as_json {
        let value = json!({
            "name": body.name,
            "time": t.to_iso(),
            "orientation": orientation,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match orientation {
        Some(o) => {
            println!("{}    {}", body.name, t);
            println!("  Pole {}", o.pole);
            println!("  Meridian:  {:.6} deg", o.meridian_deg);
        }
        None => println!("{}    rotation undefined", body.name),
    }
    Ok(())
}

fn print_star(eph: &Ephemeris, name: &str, t: JulianDate, as_json: bool) -> Result<()> {
    let star = eph.star(name)?;
    let position = eph.apparent_position_of(name, t)?;

    if as_json {
        let value = json!({
            "name": star.name,
            "time": t.to_iso(),
            "position": position,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} {}    {}", star.symbol(), star.name, t);
    println!("  {}", position);
    Ok(())
}

fn print_entry(catalog: &Catalog, name: &str, as_json: bool) -> Result<()> {
    if let Some(body) = catalog.body(name) {
        if as_json {
            println!("{}", serde_json::to_string_pretty(body)?);
        } else {
            print!("{}", body);
        }
        return Ok(());
    }
    match catalog.star(name) {
        Some(star) if as_json => println!("{}", serde_json::to_string_pretty(star)?),
        Some(star) => print!("{}", star),
        None => anyhow::bail!("no body or star named '{}'", name),
    }
    Ok(())
}

fn print_tree(catalog: &Catalog, hierarchy: &Hierarchy) {
    for (id, depth) in hierarchy.depth_first() {
        let body = &catalog.bodies()[id.index()];
        println!(
            "{}{} {} ({})",
            "  ".repeat(depth),
            body.symbol,
            body.name(),
            body.kind
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut loader = Loader::new().with_default_paths(!args.no_default_catalogs);
    for path in &args.input {
        loader = loader.with_path(path);
    }

    let config = read_config(args.config.as_ref())?;
    let eph = loader
        .load_ephemeris(config)
        .context("loading catalogs")?;
    let t = query_time(args.time.as_deref())?;

    match &args.command {
        Command::Position { bodies } => {
            for name in bodies {
                print_position(&eph, name, t, args.json)?;
            }
        }
        Command::Orientation { bodies } => {
            for name in bodies {
                print_orientation(&eph, name, t, args.json)?;
            }
        }
        Command::Star { names } => {
            for name in names {
                print_star(&eph, name, t, args.json)?;
            }
        }
        Command::Show { objects } => {
            for name in objects {
                print_entry(eph.catalog(), name, args.json)?;
            }
        }
        Command::Tree => print_tree(eph.catalog(), eph.hierarchy()),
    }
    Ok(())
}
