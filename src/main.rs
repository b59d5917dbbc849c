use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use trivia_board::adapters::terminal::{parse_command, Command};
use trivia_board::core::{CategorySource, ConfigProvider, Renderer};
use trivia_board::utils::error::ErrorSeverity;
use trivia_board::utils::{logger, validation::Validate};
use trivia_board::{
    BoardController, CliConfig, JServiceSource, SetupPolicy, TerminalRenderer, TomlConfig,
    TriviaError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting trivia-board");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };
    tracing::debug!("Resolved config: {:?}", config);

    let mut source = JServiceSource::from_config(&config)?;
    if let Some(seed) = cli.seed {
        tracing::info!("🎲 Using seed {}", seed);
        source = source.with_seed(seed);
    }

    let controller = BoardController::with_policy(
        source,
        TerminalRenderer::new(std::io::stdout()),
        SetupPolicy::from_config(&config),
    );

    print_help();
    start_game(&controller, &config).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Command::Activate(cell)) => {
                let board = controller.board();
                if board.is_empty() {
                    println!("No board yet, type `r` to start a game.");
                } else if board.clue_at(cell).is_err() {
                    println!(
                        "Pick a row 1-{} and a column 1-{}.",
                        board.row_count(),
                        board.column_count()
                    );
                } else if controller.handle_activation(cell).is_none() {
                    println!("That clue is already answered.");
                }
            }
            Ok(Command::Restart) => start_game(&controller, &config).await,
            Ok(Command::Help) => print_help(),
            Ok(Command::Quit) => break,
            Err(message) => println!("{}", message),
        }
    }

    tracing::info!("Bye");
    Ok(())
}

fn load_config(cli: &CliConfig) -> Result<TomlConfig, TriviaError> {
    let config = cli.resolve()?;
    config.validate()?;
    Ok(config)
}

async fn start_game<S: CategorySource, R: Renderer>(
    controller: &BoardController<S, R>,
    config: &TomlConfig,
) {
    if let Err(e) = controller
        .setup_game(config.category_count(), config.clue_count())
        .await
    {
        // the renderer already printed the user-facing message
        println!("💡 {}. Type `r` to try again.", e.recovery_suggestion());
    }
}

fn print_help() {
    println!("Commands: `<row> <col>` reveals a clue, `r` restarts, `q` quits.");
}

fn exit_code(e: &TriviaError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
