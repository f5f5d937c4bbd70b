use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use migration::MigratorTrait;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub username: String,
        pub password_hash: String,
        pub cost_center_id: i32,
        pub role: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

mod cost_centers {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "cost_centers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

mod budget_lines {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "budget_lines")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub rubro: String,
        pub pda_gral: String,
        pub pda: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "asiento_admin")]
#[command(about = "Admin utilities for Asiento (bootstrap users and reference data)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./asiento.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    CostCenter(CostCenter),
    BudgetLine(BudgetLine),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    SetPassword(UserSetPasswordArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// Name of the cost center the account belongs to.
    #[arg(long)]
    cost_center: String,
    #[arg(long, default_value = "standard")]
    role: String,
}

#[derive(Args, Debug)]
struct UserSetPasswordArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct CostCenter {
    #[command(subcommand)]
    command: CostCenterCommand,
}

#[derive(Subcommand, Debug)]
enum CostCenterCommand {
    Create(CostCenterCreateArgs),
}

#[derive(Args, Debug)]
struct CostCenterCreateArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct BudgetLine {
    #[command(subcommand)]
    command: BudgetLineCommand,
}

#[derive(Subcommand, Debug)]
enum BudgetLineCommand {
    Create(BudgetLineCreateArgs),
}

#[derive(Args, Debug)]
struct BudgetLineCreateArgs {
    #[arg(long)]
    rubro: String,
    #[arg(long)]
    pda_gral: String,
    #[arg(long)]
    pda: String,
}

fn parse_role(raw: &str) -> Result<&'static str, String> {
    match raw {
        "standard" => Ok("standard"),
        "administrative" => Ok("administrative"),
        other => Err(format!("unsupported role: {other}")),
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let role = match parse_role(&args.role) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };

            let Some(center) = cost_centers::Entity::find()
                .filter(cost_centers::Column::Name.eq(&args.cost_center))
                .one(&db)
                .await?
            else {
                eprintln!("cost center not found: {}", args.cost_center);
                std::process::exit(1);
            };

            if users::Entity::find()
                .filter(users::Column::Username.eq(&args.username))
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let password = prompt_password_twice()?;
            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password_hash: Set(engine::hash_password(&password)?),
                cost_center_id: Set(center.id),
                role: Set(role.to_string()),
                ..Default::default()
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::User(User {
            command: UserCommand::SetPassword(args),
        }) => {
            let Some(user) = users::Entity::find()
                .filter(users::Column::Username.eq(&args.username))
                .one(&db)
                .await?
            else {
                eprintln!("user not found: {}", args.username);
                std::process::exit(1);
            };

            let password = prompt_password_twice()?;
            let mut user: users::ActiveModel = user.into();
            user.password_hash = Set(engine::hash_password(&password)?);
            users::Entity::update(user).exec(&db).await?;

            println!("updated password for: {}", args.username);
        }
        Command::CostCenter(CostCenter {
            command: CostCenterCommand::Create(args),
        }) => {
            if cost_centers::Entity::find()
                .filter(cost_centers::Column::Name.eq(&args.name))
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("cost center already exists: {}", args.name);
                std::process::exit(1);
            }

            let center = cost_centers::ActiveModel {
                name: Set(args.name.clone()),
                ..Default::default()
            };
            cost_centers::Entity::insert(center).exec(&db).await?;

            println!("created cost center: {}", args.name);
        }
        Command::BudgetLine(BudgetLine {
            command: BudgetLineCommand::Create(args),
        }) => {
            if budget_lines::Entity::find()
                .filter(budget_lines::Column::Rubro.eq(&args.rubro))
                .filter(budget_lines::Column::PdaGral.eq(&args.pda_gral))
                .filter(budget_lines::Column::Pda.eq(&args.pda))
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!(
                    "budget line already exists: ({}, {}, {})",
                    args.rubro, args.pda_gral, args.pda
                );
                std::process::exit(1);
            }

            let line = budget_lines::ActiveModel {
                rubro: Set(args.rubro.clone()),
                pda_gral: Set(args.pda_gral.clone()),
                pda: Set(args.pda.clone()),
                ..Default::default()
            };
            budget_lines::Entity::insert(line).exec(&db).await?;

            println!(
                "created budget line: ({}, {}, {})",
                args.rubro, args.pda_gral, args.pda
            );
        }
    }

    Ok(())
}
