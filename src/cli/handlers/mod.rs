mod config;
pub use config::cmd_config;

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, API_URL_ENV};
use crate::io::http::HttpStore;
use crate::io::state;
use crate::io::store::TaskStore;
use crate::model::config::ClientConfig;
use crate::model::section::{DropOrigin, Section};
use crate::model::task::{DEFAULT_CATEGORY, NewTask, Task, TaskPatch};
use crate::ops::triage::{Reorder, TriageBoard, TriageError};

type Board = TriageBoard<HttpStore>;
type CmdResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let file_config = config_io::read_config(&config_io::config_path())?;
    let config = config_io::apply_overrides(
        file_config,
        std::env::var(API_URL_ENV).ok(),
        cli.api_url.as_deref(),
        cli.state_file.as_deref(),
    );
    let ctx = Context { json, config };

    match cli.command {
        // Read commands
        Commands::Today => cmd_today(&ctx),
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Available => cmd_available(&ctx),
        Commands::Show(args) => cmd_show(&ctx, args),

        // Triage
        Commands::Place(args) => cmd_place(&ctx, args),
        Commands::Reorder(args) => cmd_reorder(&ctx, args),
        Commands::Unplan(args) => cmd_unplan(&ctx, args),
        Commands::Expand(args) => cmd_expand(&ctx, args),

        // Write commands
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Done(args) => cmd_done(&ctx, args),
        Commands::Title(args) => cmd_title(&ctx, args),
        Commands::Edit(args) => cmd_edit(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Sub(args) => cmd_sub(&ctx, args),

        Commands::Category(args) => cmd_category(&ctx, args),
        Commands::Health => cmd_health(&ctx),
        Commands::Config(args) => cmd_config(&ctx.config, args, json),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

struct Context {
    json: bool,
    config: ClientConfig,
}

impl Context {
    fn store(&self) -> Result<HttpStore, Box<dyn Error>> {
        let server = &self.config.server;
        Ok(HttpStore::new(
            &server.base_url,
            Duration::from_secs(server.timeout_secs),
        )?)
    }
}

/// Load the triage state, build a board over the server and fetch tasks,
/// run `f`, then save the state if it changed. The state is saved even when
/// `f` fails, since a failed call may have evicted a vanished task.
fn with_board<F>(ctx: &Context, f: F) -> CmdResult
where
    F: FnOnce(&mut Board) -> CmdResult,
{
    let path: PathBuf = config_io::state_path(&ctx.config);
    let loaded = state::read_triage_state(&path).unwrap_or_default();
    let today = chrono::Local::now().date_naive();

    let mut board = TriageBoard::new(ctx.store()?, loaded.clone(), today);
    let outcome = board.refresh().map_err(Into::into).and_then(|_| f(&mut board));

    if board.state() != &loaded {
        log::debug!("saving triage state to {}", path.display());
        state::write_triage_state(&path, board.state())?;
    }
    outcome
}

fn require_task<'a>(board: &'a Board, id: &str) -> Result<&'a Task, TriageError> {
    board
        .task(id)
        .ok_or_else(|| TriageError::UnknownTask(id.to_string()))
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_opt_date(s: Option<&str>) -> Result<Option<chrono::NaiveDate>, String> {
    s.map(parse_date).transpose()
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_today(ctx: &Context) -> CmdResult {
    with_board(ctx, |board| {
        if ctx.json {
            return print_json(&TodayJson {
                date: board.today(),
                important: board.important_list().into_iter().map(task_to_json).collect(),
                extra: board.extra_list().into_iter().map(task_to_json).collect(),
            });
        }
        let sections: Vec<(Section, Vec<&Task>)> = Section::ALL
            .iter()
            .map(|&s| (s, board.section_list(s)))
            .collect();
        print_lines(format_today(board.today(), &sections, |id| {
            board.is_expanded(id)
        }));
        Ok(())
    })
}

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    with_board(ctx, |board| {
        board.refresh_categories()?;

        // Known categories first, then any category IDs only seen on tasks
        let mut pools: Vec<(String, String)> = board
            .categories()
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();
        for task in board.tasks() {
            if let Some(ref id) = task.category
                && !pools.iter().any(|(known, _)| known == id)
            {
                pools.push((id.clone(), id.clone()));
            }
        }
        if let Some(ref only) = args.category {
            pools.retain(|(id, _)| id == only);
            if pools.is_empty() {
                pools.push((only.clone(), only.clone()));
            }
        }

        if ctx.json {
            let listing: Vec<CategoryListingJson> = pools
                .iter()
                .map(|(id, _)| CategoryListingJson {
                    category: id.clone(),
                    tasks: board.by_category(id).into_iter().map(task_to_json).collect(),
                })
                .collect();
            return print_json(&listing);
        }

        let mut first = true;
        for (id, name) in &pools {
            let tasks = board.by_category(id);
            if tasks.is_empty() && args.category.is_none() {
                continue;
            }
            if !first {
                println!();
            }
            first = false;
            print_lines(format_category_listing(name, id, &tasks));
        }
        Ok(())
    })
}

fn cmd_available(ctx: &Context) -> CmdResult {
    with_board(ctx, |board| {
        let tasks = board.available();
        if ctx.json {
            let out: Vec<TaskJson> = tasks.into_iter().map(task_to_json).collect();
            return print_json(&out);
        }
        for task in tasks {
            println!("{}", format_task_line(task));
        }
        Ok(())
    })
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> CmdResult {
    with_board(ctx, |board| {
        let task = require_task(board, &args.id)?;
        if ctx.json {
            return print_json(&task_to_json(task));
        }
        print_lines(format_task_detail(task, board.section_of(&args.id)));
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Triage commands
// ---------------------------------------------------------------------------

fn cmd_place(ctx: &Context, args: PlaceArgs) -> CmdResult {
    let section: Section = args.section.parse()?;
    with_board(ctx, |board| {
        // Already on today's board: a local move. Otherwise schedule it first.
        let origin = match board.section_of(&args.id) {
            Some(_) => DropOrigin::TodayList,
            None => DropOrigin::CategoryList,
        };
        board.drop_on_section(&args.id, section, origin)?;
        if ctx.json {
            return print_json(&PlacementJson {
                id: args.id.clone(),
                section,
            });
        }
        println!("{} -> {}", args.id, section);
        Ok(())
    })
}

fn cmd_reorder(ctx: &Context, args: ReorderArgs) -> CmdResult {
    with_board(ctx, |board| {
        let origin = board
            .section_of(&args.id)
            .ok_or_else(|| format!("{} is not on today's board", args.id))?;
        let section = board
            .section_of(&args.target)
            .ok_or_else(|| format!("{} is not on today's board", args.target))?;
        match board.reorder_within_section(&args.id, &args.target, origin, section) {
            Reorder::Moved { index } => {
                println!("{} -> {} #{}", args.id, section, index + 1);
                Ok(())
            }
            Reorder::CrossSection => Err(format!(
                "{} is in {} but {} is in {}; use `tayra place` to change sections",
                args.id, origin, args.target, section
            )
            .into()),
            Reorder::NotShown => Err(format!("{} is not shown in {}", args.target, section).into()),
        }
    })
}

fn cmd_unplan(ctx: &Context, args: UnplanArgs) -> CmdResult {
    with_board(ctx, |board| {
        let category = match args.category {
            Some(ref c) => c.clone(),
            None => board
                .task(&args.id)
                .and_then(|t| t.category.clone())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        };
        board.drop_back_to_category(&args.id, &category)?;
        println!("{} -> {}", args.id, category);
        Ok(())
    })
}

fn cmd_expand(ctx: &Context, args: IdArg) -> CmdResult {
    with_board(ctx, |board| {
        require_task(board, &args.id)?;
        let expanded = board.toggle_expanded(&args.id);
        println!(
            "{} {}",
            args.id,
            if expanded { "expanded" } else { "collapsed" }
        );
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let section: Option<Section> = args.section.as_deref().map(str::parse::<Section>).transpose()?;
    let draft = NewTask {
        title: args.title,
        description: args.description,
        category: args.category,
        due_date: parse_opt_date(args.due.as_deref())?,
        do_date: parse_opt_date(args.do_date.as_deref())?,
        is_ephemeral: args.ephemeral,
        notes: args.notes,
    };
    with_board(ctx, |board| {
        let task = match section {
            Some(section) => board.create_in_section(draft, section)?,
            None => board.create_task(draft)?,
        };
        if ctx.json {
            return print_json(&task_to_json(&task));
        }
        println!("{}", task.id);
        Ok(())
    })
}

fn cmd_done(ctx: &Context, args: IdArg) -> CmdResult {
    with_board(ctx, |board| {
        let task = board.toggle_task(&args.id)?;
        println!(
            "{} {}",
            task.id,
            if task.completed { "done" } else { "reopened" }
        );
        Ok(())
    })
}

fn cmd_title(ctx: &Context, args: TitleArgs) -> CmdResult {
    with_board(ctx, |board| {
        let task = board.rename_task(&args.id, &args.title)?;
        println!("{} {}", task.id, task.title);
        Ok(())
    })
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let due_date = if args.clear_due {
        Some(None)
    } else {
        parse_opt_date(args.due.as_deref())?.map(Some)
    };
    let do_date = if args.clear_do {
        Some(None)
    } else {
        parse_opt_date(args.do_date.as_deref())?.map(Some)
    };
    let is_ephemeral = match (args.ephemeral, args.no_ephemeral) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };
    let patch = TaskPatch {
        description: args.description,
        category: args.category,
        due_date,
        do_date,
        is_ephemeral,
        notes: args.notes,
        ..Default::default()
    };
    if patch.is_empty() {
        return Err("nothing to change (see `tayra edit --help`)".into());
    }
    with_board(ctx, |board| {
        let task = board.edit_task(&args.id, &patch)?;
        if ctx.json {
            return print_json(&task_to_json(&task));
        }
        print_lines(format_task_detail(&task, board.section_of(&task.id)));
        Ok(())
    })
}

fn cmd_rm(ctx: &Context, args: IdArg) -> CmdResult {
    with_board(ctx, |board| {
        board.delete_task(&args.id)?;
        println!("deleted {}", args.id);
        Ok(())
    })
}

fn cmd_sub(ctx: &Context, args: SubCmd) -> CmdResult {
    with_board(ctx, |board| {
        let subtask = match args.action {
            SubAction::Add { task_id, title } => board.add_subtask(&task_id, &title)?,
            SubAction::Done {
                task_id,
                subtask_id,
            } => board.toggle_subtask(&task_id, &subtask_id)?,
        };
        if ctx.json {
            return print_json(&subtask_to_json(&subtask));
        }
        println!("{}", format_subtask_line(&subtask, 0));
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

fn cmd_category(ctx: &Context, args: CategoryCmd) -> CmdResult {
    with_board(ctx, |board| {
        board.refresh_categories()?;
        match args.action.unwrap_or(CategoryAction::List) {
            CategoryAction::List => {
                if ctx.json {
                    let out: Vec<CategoryJson> = board
                        .categories()
                        .iter()
                        .map(|c| category_to_json(c, board.by_category(&c.id).len()))
                        .collect();
                    return print_json(&out);
                }
                for category in board.categories() {
                    println!(
                        "{}",
                        format_category_line(category, board.by_category(&category.id).len())
                    );
                }
            }
            CategoryAction::Add { name, color } => {
                let category = board.add_category(&name, color.as_deref())?;
                println!("{}", category.id);
            }
            CategoryAction::Rename { id, name } => {
                let category = board.rename_category(&id, &name)?;
                println!("{} {}", category.id, category.name);
            }
            CategoryAction::Rm { id } => {
                board.delete_category(&id)?;
                println!("deleted category {}", id);
            }
        }
        Ok(())
    })
}

fn cmd_health(ctx: &Context) -> CmdResult {
    ctx.store()?.health()?;
    println!("ok {}", ctx.config.server.base_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_dates_parse_or_fail() {
        assert_eq!(parse_opt_date(None), Ok(None));
        assert_eq!(
            parse_opt_date(Some("2025-06-01")),
            Ok(chrono::NaiveDate::from_ymd_opt(2025, 6, 1))
        );
        assert!(parse_opt_date(Some("06/01/2025")).is_err());
    }
}
