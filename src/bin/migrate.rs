use axum_shop_api::{config::AppConfig, db::create_orm_conn, migrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("up") => {
            let applied = migrator::up(&orm, parse_steps(args.get(1))?).await?;
            if applied.is_empty() {
                println!("Nothing to apply");
            }
            for name in applied {
                println!("Applied {name}");
            }
        }
        Some("down") => {
            let steps = parse_steps(args.get(1))?.or(Some(1));
            let reverted = migrator::down(&orm, steps).await?;
            if reverted.is_empty() {
                println!("Nothing to revert");
            }
            for name in reverted {
                println!("Reverted {name}");
            }
        }
        Some("status") => {
            for (name, state) in migrator::status(&orm).await? {
                println!("{:<8} {}", state.to_string(), name);
            }
        }
        Some("apply") => {
            let name = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("apply requires a migration name"))?;
            migrator::apply(&orm, name).await?;
            println!("Applied {name}");
        }
        Some("revert") => {
            let name = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("revert requires a migration name"))?;
            migrator::revert(&orm, name).await?;
            println!("Reverted {name}");
        }
        _ => {
            eprintln!(
                "usage: migrate <up [N] | down [N|all] | status | apply <name> | revert <name>>"
            );
            std::process::exit(2);
        }
    }

    Ok(())
}

fn parse_steps(arg: Option<&String>) -> anyhow::Result<Option<usize>> {
    match arg.map(String::as_str) {
        None => Ok(None),
        Some("all") => Ok(None),
        Some(raw) => {
            let steps = raw
                .parse::<usize>()
                .map_err(|_| anyhow::anyhow!("steps must be a number or `all`"))?;
            Ok(Some(steps))
        }
    }
}
