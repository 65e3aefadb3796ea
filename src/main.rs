//src/main.rs
mod cli;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{self, stdout};
use tracing_subscriber::EnvFilter;

use workout_summary_lib::catalog::{self, CatalogExercise, CatalogFilter};
use workout_summary_lib::{
    Breakdowns, DateRange, ExerciseRecord, Facets, FilterCriteria, HistoryService,
    HistorySummary, NewRecord, Selector, Totals, Units,
};

fn main() -> Result<()> {
    let cli_args = cli::parse_args();
    init_logging(cli_args.verbose)?;
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();
        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let mut service =
        HistoryService::initialize().context("Failed to initialize history service")?;
    let today = Local::now().date_naive();

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Add {
            exercise,
            sets,
            reps,
            weight,
            workout_type,
            muscle,
            date,
            set_type,
            additional,
            notes,
        } => {
            let date = date.unwrap_or(today);
            let new_record = NewRecord {
                exercise_name: exercise,
                sets,
                reps,
                weight,
                workout_type,
                muscle_group: muscle,
                date,
                set_type,
                additional_exercises: additional,
                notes,
            };
            let name = new_record.exercise_name.trim().to_string();
            match service.add_record(new_record) {
                Ok(id) => println!(
                    "Successfully added '{name}' on {} ID: {id}",
                    date.format("%Y-%m-%d")
                ),
                Err(e) => bail!("Error adding record: {e:#}"),
            }
        }
        cli::Commands::Delete { ids } => {
            for id in &ids {
                match service.delete_record(id) {
                    Ok(()) => println!("Deleted record {id}."),
                    Err(e) => bail!("Error deleting record {id}: {e:#}"),
                }
            }
        }
        cli::Commands::Show { id } => {
            let Some(record) = service.get_record(&id)? else {
                bail!("Record not found: {id}");
            };
            let records = [record];
            let summary = service.summarize(&records, &FilterCriteria::inactive());
            if export_csv {
                print_history_csv(&summary)?;
            } else {
                print_history_tables(&summary, service.config.header_color(), service.config.units);
            }
        }
        cli::Commands::List { filters } => {
            let criteria = build_criteria(&service, filters, today);
            let records = service.list_records()?;
            let summary = service.summarize(&records, &criteria);
            if export_csv {
                print_history_csv(&summary)?;
            } else {
                if summary.filtered.is_empty() {
                    print_empty_hint(&criteria, today, service.config.default_range_days);
                    return Ok(());
                }
                print_history_tables(&summary, service.config.header_color(), service.config.units);
                print_totals_table(&summary.totals, service.config.header_color(), service.config.units);
                if criteria.has_filters(today, service.config.default_range_days) {
                    println!("Filters active: {}", describe_criteria(&criteria));
                }
            }
        }
        cli::Commands::Stats { filters } => {
            let criteria = build_criteria(&service, filters, today);
            let records = service.list_records()?;
            let summary = service.summarize(&records, &criteria);
            let breakdowns = service.breakdowns(&records, &criteria);
            if export_csv {
                print_stats_csv(&summary.totals, &breakdowns)?;
            } else {
                if summary.filtered.is_empty() {
                    print_empty_hint(&criteria, today, service.config.default_range_days);
                    return Ok(());
                }
                let color = service.config.header_color();
                print_totals_table(&summary.totals, color, service.config.units);
                print_breakdown_tables(&breakdowns, color, service.config.units);
            }
        }
        cli::Commands::Facets => {
            let facets = service.facets()?;
            print_facets(&facets, service.config.header_color());
        }
        cli::Commands::Import { path } => {
            let report = service.import_json(&path)?;
            println!(
                "Imported {} record(s) from {}; skipped {} already present.",
                report.imported,
                path.display(),
                report.skipped_duplicates
            );
        }
        cli::Commands::Catalog {
            search,
            muscle,
            equipment,
            difficulty,
            file,
        } => {
            let exercises = match file {
                Some(path) => catalog::load_catalog(&path)?,
                None => service.load_catalog()?,
            };
            let filter = CatalogFilter {
                search: search.as_deref(),
                muscle_group: muscle.as_deref(),
                equipment: equipment.as_deref(),
                difficulty: difficulty.as_deref(),
            };
            let hits = catalog::filter_catalog(&exercises, &filter);
            if export_csv {
                print_catalog_csv(&hits)?;
            } else {
                print_catalog_table(&hits, service.config.header_color());
                let facets = catalog::catalog_facets(&exercises);
                println!("Muscle groups: {}", facets.muscle_groups.join(", "));
                println!("Equipment:     {}", facets.equipment.join(", "));
                println!("Difficulty:    {}", facets.difficulties.join(", "));
            }
        }
        cli::Commands::SetRangeDays { days } => {
            service.set_default_range_days(days)?;
            println!(
                "Default date window set to the last {days} day(s). Config: {:?}",
                service.get_config_path()
            );
        }
        cli::Commands::SetUnits { units } => {
            let units = match units {
                cli::UnitsCli::Metric => Units::Metric,
                cli::UnitsCli::Imperial => Units::Imperial,
            };
            service.set_units(units)?;
            println!("Units set to {units:?}.");
        }
        cli::Commands::DbPath => {
            println!("Database file is located at: {:?}", service.get_db_path());
        }
        cli::Commands::ConfigPath => {
            println!("Config file is located at: {:?}", service.get_config_path());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn build_criteria(service: &HistoryService, filters: cli::FilterArgs, today: NaiveDate) -> FilterCriteria {
    let mut criteria = service.default_criteria(today);
    criteria.search = filters.search.unwrap_or_default();
    criteria.workout_type = Selector::from(filters.workout_type);
    criteria.muscle_group = Selector::from(filters.muscle);

    if filters.all_dates {
        criteria.date_range = DateRange::default();
    } else {
        if let Some(from) = filters.from {
            criteria.date_range.from = Some(from);
        }
        if let Some(to) = filters.to {
            criteria.date_range.to = Some(to);
        }
    }
    criteria
}

fn describe_criteria(criteria: &FilterCriteria) -> String {
    if criteria.is_inactive() {
        return "none, every date included".to_string();
    }
    let day = |d: Option<NaiveDate>| d.map_or("any".to_string(), |d| d.format("%Y-%m-%d").to_string());
    let mut parts = Vec::new();
    if !criteria.search.is_empty() {
        parts.push(format!("search \"{}\"", criteria.search));
    }
    parts.push(format!("type {}", criteria.workout_type));
    parts.push(format!("muscle {}", criteria.muscle_group));
    parts.push(format!(
        "dates {} to {}",
        day(criteria.date_range.from),
        day(criteria.date_range.to)
    ));
    parts.join(", ")
}

fn print_empty_hint(criteria: &FilterCriteria, today: NaiveDate, range_days: u32) {
    println!("No workouts found.");
    if criteria.has_filters(today, range_days) {
        println!("Try adjusting your filters ({}).", describe_criteria(criteria));
    } else {
        println!("Try --all-dates, or add a new workout with `add`.");
    }
}

fn opt_num<T: ToString>(value: Option<T>) -> String {
    value.map_or("-".to_string(), |v| v.to_string())
}

fn extras_cell(record: &ExerciseRecord) -> String {
    let extras = record.extras();
    if extras.is_empty() {
        "-".to_string()
    } else {
        extras.join(", ")
    }
}

/// Prints one table per group, in first-seen group order.
fn print_history_tables(summary: &HistorySummary, header_color: Color, units: Units) {
    let weight_header = format!("Weight ({})", units.weight_label());
    for group in &summary.groups {
        println!(
            "\n{}  ({} exercise{})",
            group.key,
            group.records.len(),
            if group.records.len() == 1 { "" } else { "s" }
        );

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("ID").fg(header_color),
                Cell::new("Exercise").fg(header_color),
                Cell::new("Sets").fg(header_color),
                Cell::new("Reps").fg(header_color),
                Cell::new(&weight_header).fg(header_color),
                Cell::new("Set Type").fg(header_color),
                Cell::new("Extras").fg(header_color),
                Cell::new("Notes").fg(header_color),
            ]);

        for record in &group.records {
            table.add_row(vec![
                Cell::new(&record.id),
                Cell::new(&record.exercise_name),
                Cell::new(opt_num(record.sets)),
                Cell::new(opt_num(record.reps)),
                Cell::new(
                    record
                        .weight
                        .filter(|w| *w > 0.0)
                        .map_or("-".to_string(), |w| format!("{w:.2}")),
                ),
                Cell::new(record.set_type.as_deref().unwrap_or("-")),
                Cell::new(extras_cell(record)),
                Cell::new(record.notes.as_deref().unwrap_or("-")),
            ]);
        }
        println!("{table}");
    }
}

fn print_totals_table(totals: &Totals, header_color: Color, units: Units) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Workouts").fg(header_color),
            Cell::new("Sets").fg(header_color),
            Cell::new("Reps").fg(header_color),
            Cell::new(format!("Volume ({})", units.weight_label())).fg(header_color),
        ]);
    table.add_row(vec![
        Cell::new(totals.total_workouts).add_attribute(Attribute::Bold),
        Cell::new(totals.total_sets).add_attribute(Attribute::Bold),
        Cell::new(totals.total_reps).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", totals.total_volume)).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn print_breakdown_tables(breakdowns: &Breakdowns, header_color: Color, units: Units) {
    if !breakdowns.daily_volume.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Date").fg(header_color),
                Cell::new(format!("Volume (Sets*Reps*Weight {})", units.weight_label()))
                    .fg(header_color),
            ]);
        for (date, volume) in &breakdowns.daily_volume {
            table.add_row(vec![
                Cell::new(date.format("%Y-%m-%d")),
                Cell::new(format!("{volume:.2}")),
            ]);
        }
        println!("\nVolume over time\n{table}");
    }

    for (title, column, rows) in [
        ("Muscle group distribution", "Muscle Group", &breakdowns.muscle_distribution),
        ("Workout type breakdown", "Workout Type", &breakdowns.type_breakdown),
    ] {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new(column).fg(header_color),
                Cell::new("Entries").fg(header_color),
            ]);
        for (name, count) in rows {
            table.add_row(vec![Cell::new(name), Cell::new(count)]);
        }
        println!("\n{title}\n{table}");
    }
}

fn print_facets(facets: &Facets, header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Workout Types").fg(header_color),
            Cell::new("Muscle Groups").fg(header_color),
        ]);
    let rows = facets.workout_types.len().max(facets.muscle_groups.len());
    for i in 0..rows {
        table.add_row(vec![
            Cell::new(facets.workout_types.get(i).map_or("", String::as_str)),
            Cell::new(facets.muscle_groups.get(i).map_or("", String::as_str)),
        ]);
    }
    println!("{table}");
}

fn print_catalog_table(exercises: &[&CatalogExercise], header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Name").fg(header_color),
            Cell::new("Muscle Group").fg(header_color),
            Cell::new("Category").fg(header_color),
            Cell::new("Equipment").fg(header_color),
            Cell::new("Difficulty").fg(header_color),
        ]);
    for ex in exercises {
        table.add_row(vec![
            Cell::new(&ex.id),
            Cell::new(&ex.name),
            Cell::new(&ex.muscle_group),
            Cell::new(&ex.category),
            Cell::new(&ex.equipment),
            Cell::new(&ex.difficulty),
        ]);
    }
    println!("{table}");
    println!("{} exercise(s) shown.", exercises.len());
}

fn print_history_csv(summary: &HistorySummary) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record([
        "Group_Date",
        "Group_Type",
        "Group_Muscle",
        "ID",
        "Exercise",
        "Sets",
        "Reps",
        "Weight",
        "Set_Type",
        "Extras",
        "Notes",
    ])?;

    for group in &summary.groups {
        for record in &group.records {
            writer.write_record([
                group.key.date_label(),
                group.key.workout_type.clone(),
                group.key.muscle_group.clone(),
                record.id.clone(),
                record.exercise_name.clone(),
                record.sets.map_or(String::new(), |v| v.to_string()),
                record.reps.map_or(String::new(), |v| v.to_string()),
                record.weight.map_or(String::new(), |v| format!("{v:.2}")),
                record.set_type.clone().unwrap_or_default(),
                record.extras().join("; "),
                record.notes.clone().unwrap_or_default(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn print_stats_csv(totals: &Totals, breakdowns: &Breakdowns) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["Metric", "Key", "Value"])?;
    writer.write_record(["total_workouts", "", &totals.total_workouts.to_string()])?;
    writer.write_record(["total_sets", "", &totals.total_sets.to_string()])?;
    writer.write_record(["total_reps", "", &totals.total_reps.to_string()])?;
    writer.write_record(["total_volume", "", &format!("{:.2}", totals.total_volume)])?;
    for (date, volume) in &breakdowns.daily_volume {
        writer.write_record([
            "daily_volume",
            &date.format("%Y-%m-%d").to_string(),
            &format!("{volume:.2}"),
        ])?;
    }
    for (name, count) in &breakdowns.muscle_distribution {
        writer.write_record(["muscle_group", name.as_str(), &count.to_string()])?;
    }
    for (name, count) in &breakdowns.type_breakdown {
        writer.write_record(["workout_type", name.as_str(), &count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_catalog_csv(exercises: &[&CatalogExercise]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["ID", "Name", "Muscle_Group", "Category", "Equipment", "Difficulty"])?;
    for ex in exercises {
        writer.write_record([
            &ex.id,
            &ex.name,
            &ex.muscle_group,
            &ex.category,
            &ex.equipment,
            &ex.difficulty,
        ])?;
    }
    writer.flush()?;
    Ok(())
}
