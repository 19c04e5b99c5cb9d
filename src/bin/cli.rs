use clap::Parser;
use course_schedule::{
    Catalog, EntryDraft, EntryId, EntryPatch, EntryStatus, GridBuilder, GridView, ScheduleEntry,
    ScheduleGrid, SchedulerConfig, Timetable, WeekPattern, WeekSet, load_catalog_from_json,
    load_time_slots_from_csv, time_slot::format_time, week_selector,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cli", about = "Interactive weekly course timetable")]
struct Args {
    /// JSON scheduler config (semester length, conflict policy).
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON catalog with time slots, classrooms, classes and courses.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// CSV time slot table; replaces the catalog's slots.
    #[arg(long)]
    slots_csv: Option<PathBuf>,
}

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_entries(timetable: &Timetable) -> String {
    let semester_weeks = timetable.semester().weeks;
    let rows: Vec<Vec<String>> = timetable
        .entries()
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.course_id.clone(),
                e.class_id.clone(),
                DAY_NAMES
                    .get(usize::from(e.day_of_week).saturating_sub(1))
                    .copied()
                    .unwrap_or("?")
                    .to_string(),
                e.time_range(),
                e.room_id.clone(),
                match week_selector::detect_pattern(&e.weeks, semester_weeks) {
                    Some(pattern) => format!("{} ({pattern})", e.weeks),
                    None => e.weeks.to_string(),
                },
                e.status.to_string(),
                e.category.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render_table(
        &[
            "id", "course", "class", "day", "time", "room", "weeks", "status", "category",
        ],
        &rows,
    )
}

fn grid_cell(entry: &ScheduleEntry) -> String {
    format!("{}/{}@{} #{}", entry.course_id, entry.class_id, entry.room_id, entry.id)
}

fn render_grid(grid: &ScheduleGrid<'_>, catalog: &Catalog) -> String {
    let mut headers = vec!["slot"];
    headers.extend(DAY_NAMES);
    let rows: Vec<Vec<String>> = grid
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let mut line = Vec::with_capacity(cells.len() + 1);
            line.push(
                catalog
                    .time_slots()
                    .slot_at(row)
                    .map(|slot| format!("{} {}", slot.label, format_time(slot.start)))
                    .unwrap_or_default(),
            );
            line.extend(cells.iter().map(|cell| cell.map(grid_cell).unwrap_or_default()));
            line
        })
        .collect();
    let mut out = format!("Grid for {}\n", grid.view());
    out.push_str(&render_table(&headers, &rows));
    for (row, column, entry) in grid.alternates() {
        let slot = catalog
            .time_slots()
            .slot_at(*row)
            .map(|slot| slot.label.as_str())
            .unwrap_or("?");
        out.push_str(&format!(
            "Also {} {slot}: {} weeks {}\n",
            DAY_NAMES[*column],
            grid_cell(entry),
            entry.weeks
        ));
    }
    if !grid.unplaced().is_empty() {
        let ids = grid
            .unplaced()
            .iter()
            .map(|e| e.id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!("Not on grid (no matching slot): {ids}\n"));
    }
    out
}

fn parse_weeks(input: &str, semester_weeks: u32) -> Result<WeekSet, String> {
    if let Ok(pattern) = input.parse::<WeekPattern>() {
        return Ok(week_selector::select(pattern, semester_weeks));
    }
    input.parse::<WeekSet>().map_err(|e| e.to_string())
}

fn parse_view(input: Option<&str>) -> Result<GridView, String> {
    match input {
        None | Some("all") | Some("semester") => Ok(GridView::Semester),
        Some(week) => week
            .parse::<u32>()
            .map(GridView::Week)
            .map_err(|_| format!("Invalid week '{week}'")),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  show                                   List schedule entries\n  slots                                  List time slots\n  weeks <pattern|list>                   Preview a week selection (all, odd, even, first-half, second-half, 1-4,9)\n  add <course> <class> <day> <slot> <room> <weeks> [category]\n                                         Create an entry (day 1=Mon..7=Sun)\n  move <id> <day> <slot>                 Change day and time slot\n  room <id> <room>                       Change room\n  setweeks <id> <weeks>                  Replace week selection\n  status <id> <active|cancelled|completed>\n                                         Change status\n  delete <id>                            Delete an entry\n  grid [week|all]                        Show the timetable grid\n  conflicts [week|all]                   List cells claimed by more than one entry\n  quit | exit                            Leave"
    );
}

fn load(args: &Args) -> Result<(SchedulerConfig, Catalog), String> {
    let config = match &args.config {
        Some(path) => SchedulerConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => SchedulerConfig::default(),
    };
    let mut catalog = match &args.catalog {
        Some(path) => load_catalog_from_json(path).map_err(|e| e.to_string())?,
        None => Catalog::standard(),
    };
    if let Some(path) = &args.slots_csv {
        let slots = load_time_slots_from_csv(path).map_err(|e| e.to_string())?;
        catalog = Catalog::new(
            slots,
            catalog.classrooms().to_vec(),
            catalog.classes().to_vec(),
            catalog.courses().to_vec(),
        )
        .map_err(|e| e.to_string())?;
    }
    Ok((config, catalog))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let (config, catalog) = match load(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let semester_weeks = config.semester_weeks;
    let builder = GridBuilder::new(catalog.time_slots()).with_policy(config.conflict_policy);
    let mut timetable = Timetable::new(config.semester());

    println!("Course Schedule (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print!("{}", render_entries(&timetable)),
            "slots" => {
                let rows: Vec<Vec<String>> = catalog
                    .time_slots()
                    .slots()
                    .iter()
                    .map(|s| {
                        vec![
                            s.id.clone(),
                            s.label.clone(),
                            format_time(s.start),
                            format_time(s.end),
                        ]
                    })
                    .collect();
                print!("{}", render_table(&["id", "label", "start", "end"], &rows));
            }
            "weeks" => match parts.next() {
                Some(spec) => match parse_weeks(spec, semester_weeks) {
                    Ok(weeks) => println!("Weeks: {} ({} total)", weeks, weeks.len()),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: weeks <pattern|list>"),
            },
            "add" => {
                let fields: Vec<&str> = parts.collect();
                if fields.len() < 6 {
                    println!("Usage: add <course> <class> <day> <slot> <room> <weeks> [category]");
                    continue;
                }
                let Ok(day) = fields[2].parse::<u8>() else {
                    println!("Invalid day");
                    continue;
                };
                let Some(slot) = catalog.time_slots().get(fields[3]) else {
                    println!("Unknown time slot '{}'", fields[3]);
                    continue;
                };
                let weeks = match parse_weeks(fields[5], semester_weeks) {
                    Ok(weeks) => weeks,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let mut draft = EntryDraft::new()
                    .course(fields[0])
                    .class(fields[1])
                    .day(day)
                    .slot(slot)
                    .room(fields[4])
                    .weeks(weeks);
                if let Some(category) = fields.get(6) {
                    draft = draft.category(*category);
                }
                if let Some(teacher) = catalog.course(fields[0]).and_then(|c| c.teacher_id.clone()) {
                    draft = draft.teacher(teacher);
                }
                if let Err(errors) = draft.check_references(&catalog) {
                    println!("Error: {errors}");
                    continue;
                }
                match timetable.create(draft) {
                    Ok((next, entry)) => {
                        timetable = next;
                        println!("Created entry {}.", entry.id);
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "move" | "room" | "setweeks" | "status" => {
                let Some(id) = parts.next().and_then(|s| s.parse::<EntryId>().ok()) else {
                    println!("Invalid id");
                    continue;
                };
                let patch = match cmd {
                    "move" => {
                        let day = parts.next().and_then(|s| s.parse::<u8>().ok());
                        let slot = parts.next().and_then(|s| catalog.time_slots().get(s));
                        match (day, slot) {
                            (Some(day), Some(slot)) => EntryPatch::new().day(day).slot(slot),
                            _ => {
                                println!("Usage: move <id> <day> <slot>");
                                continue;
                            }
                        }
                    }
                    "room" => match parts.next() {
                        Some(room) if catalog.knows_classroom(room) => EntryPatch::new().room(room),
                        Some(room) => {
                            println!("Unknown classroom '{room}'");
                            continue;
                        }
                        None => {
                            println!("Usage: room <id> <room>");
                            continue;
                        }
                    },
                    "setweeks" => match parts.next().map(|s| parse_weeks(s, semester_weeks)) {
                        Some(Ok(weeks)) => EntryPatch::new().weeks(weeks),
                        Some(Err(e)) => {
                            println!("Error: {e}");
                            continue;
                        }
                        None => {
                            println!("Usage: setweeks <id> <weeks>");
                            continue;
                        }
                    },
                    _ => match parts.next().map(str::parse::<EntryStatus>) {
                        Some(Ok(status)) => EntryPatch::new().status(status),
                        Some(Err(e)) => {
                            println!("Error: {e}");
                            continue;
                        }
                        None => {
                            println!("Usage: status <id> <active|cancelled|completed>");
                            continue;
                        }
                    },
                };
                match timetable.update(id, &patch) {
                    Ok(next) => {
                        timetable = next;
                        println!("Updated entry {id}.");
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "delete" => match parts.next().map(str::parse::<EntryId>) {
                Some(Ok(id)) => match timetable.delete(id) {
                    Ok(next) => {
                        timetable = next;
                        println!("Deleted entry {id}.");
                    }
                    Err(e) => println!("Error: {e}"),
                },
                Some(Err(_)) => println!("Invalid id"),
                None => println!("Usage: delete <id>"),
            },
            "grid" => match parse_view(parts.next()) {
                Ok(view) => match builder.build(timetable.entries(), view) {
                    Ok(grid) => print!("{}", render_grid(&grid, &catalog)),
                    Err(conflict) => println!("Conflict: {conflict}"),
                },
                Err(e) => println!("{e}"),
            },
            "conflicts" => match parse_view(parts.next()) {
                Ok(view) => {
                    let conflicts = builder.conflicts(timetable.entries(), view);
                    if conflicts.is_empty() {
                        println!("No conflicts in {view}.");
                    }
                    for conflict in conflicts {
                        println!("Conflict: {conflict}");
                    }
                }
                Err(e) => println!("{e}"),
            },
            _ => println!("Unknown command '{cmd}'. Type 'help'."),
        }
    }
    ExitCode::SUCCESS
}
