#![forbid(unsafe_code)]
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use cover_my_class::{
    engine::{ConflictKind, EngineOptions, SubstitutionEngine},
    io,
    model::{AbsenceStatus, TeacherId},
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

const DAY_LABELS: [&str; 6] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// CLI de gestion des emplois du temps et des remplacements
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON d'état de l'établissement
    #[arg(long, global = true, default_value = "school.json")]
    state: String,

    /// Tentatives de commit avant de déclarer une absence non pourvue (≥ 1)
    #[arg(long, global = true, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un enseignant
    AddTeacher {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Retirer un enseignant (et son emploi du temps)
    RemoveTeacher {
        #[arg(long)]
        teacher: String,
    },

    /// Lister les enseignants
    Teachers,

    /// Remplacer l'emploi du temps d'un enseignant depuis un CSV `day,p1..p8`
    SetTimetable {
        #[arg(long)]
        teacher: String,
        #[arg(long)]
        csv: String,
    },

    /// Afficher l'emploi du temps d'un enseignant
    Timetable {
        #[arg(long)]
        teacher: String,
    },

    /// Déclarer une absence et assigner un remplaçant
    ReportAbsence {
        #[arg(long)]
        teacher: String,
        /// 0 = lundi … 5 = samedi
        #[arg(long)]
        day: u8,
        /// 0 … 7
        #[arg(long)]
        period: u8,
        /// Classe attendue sur ce créneau
        #[arg(long)]
        class: String,
    },

    /// Lister et optionnellement exporter les remplacements
    Substitutions {
        /// Seulement les remplacements assurés par cet enseignant
        #[arg(long)]
        teacher: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier l'invariant d'occupation
    Check,
}

fn resolve(engine: &SubstitutionEngine, username: &str) -> Result<TeacherId> {
    engine
        .directory()
        .find_by_username(username)
        .map(|t| t.id)
        .ok_or_else(|| anyhow!("unknown teacher: {}", username))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let opts = EngineOptions {
        max_commit_attempts: cli.max_attempts,
    };
    let storage = JsonStorage::open(&cli.state)?;
    let engine = SubstitutionEngine::from_snapshot(storage.load_or_default()?, opts);

    let code = match cli.cmd {
        Commands::AddTeacher { username, password } => {
            let id = engine.add_teacher(&username, &password)?;
            storage.save(&engine.snapshot())?;
            println!("{} {}", id, username);
            0
        }
        Commands::RemoveTeacher { teacher } => {
            let id = resolve(&engine, &teacher)?;
            engine.remove_teacher(id)?;
            storage.save(&engine.snapshot())?;
            0
        }
        Commands::Teachers => {
            for t in engine.list_teachers() {
                let has_timetable = engine.get_timetable(t.id).is_ok();
                println!(
                    "{} | {} | {}",
                    t.id,
                    t.username,
                    if has_timetable { "timetable" } else { "-" }
                );
            }
            0
        }
        Commands::SetTimetable { teacher, csv } => {
            let id = resolve(&engine, &teacher)?;
            let grid = io::import_timetable_csv(csv)?;
            engine.set_timetable(id, grid.rows())?;
            storage.save(&engine.snapshot())?;
            0
        }
        Commands::Timetable { teacher } => {
            let id = resolve(&engine, &teacher)?;
            let grid = engine.get_timetable(id)?;
            for (label, row) in DAY_LABELS.iter().zip(grid.rows()) {
                let cells: Vec<&str> = row
                    .iter()
                    .map(|c| if c.is_empty() { "-" } else { c.as_str() })
                    .collect();
                println!("{} | {}", label, cells.join(" | "));
            }
            0
        }
        Commands::ReportAbsence {
            teacher,
            day,
            period,
            class,
        } => {
            let id = resolve(&engine, &teacher)?;
            let outcome = engine.report_absence(id, day, period, &class)?;
            let snapshot = engine.snapshot();
            storage.save(&snapshot)?;
            match (outcome.status, outcome.substitute) {
                (AbsenceStatus::Assigned, Some(sub)) => {
                    println!("assigned {}", io::username_of(&snapshot, sub));
                    0
                }
                _ => {
                    let reason = outcome.reason.map(|r| r.label()).unwrap_or("unknown");
                    println!("unfilled ({})", reason);
                    // Code 2 = WARNING/INCOMPLETE
                    2
                }
            }
        }
        Commands::Substitutions { teacher, out_csv } => {
            let snapshot = engine.snapshot();
            if let Some(path) = out_csv {
                io::export_substitutions_csv(path, &snapshot)?;
            }
            let assignments = match teacher {
                Some(name) => engine.list_substitutions_for(resolve(&engine, &name)?),
                None => engine.list_all_substitutions(),
            };
            // impression compacte
            for a in &assignments {
                println!(
                    "{} | {} P{} | {} | {}",
                    a.id,
                    DAY_LABELS[usize::from(a.slot.day())],
                    a.slot.period() + 1,
                    a.class_name,
                    io::username_of(&snapshot, a.substitute)
                );
            }
            0
        }
        Commands::Check => {
            let conflicts = engine.detect_conflicts();
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    eprintln!(
                        "{} day {} period {}: {}",
                        c.teacher,
                        c.day,
                        c.period,
                        match c.kind {
                            ConflictKind::TeachingOverlap => "teaching overlap",
                            ConflictKind::DoubleAssignment => "double assignment",
                        }
                    );
                }
                2
            }
        }
    };

    std::process::exit(code);
}
