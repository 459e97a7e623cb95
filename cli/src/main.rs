//! Command-line front end for the light-freight bulletin board.
//!
//! Every invocation opens the board file, performs one operation and exits.
//! `wait` stays up and counts down a rate-limit block.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use kamotsu_board::ticker::BlockTicker;
use kamotsu_board::{Board, BoardError, FileStore};
use kamotsu_common::account::{AccountForm, AccountKind};
use kamotsu_common::channel::Channel;
use kamotsu_common::message::{MessageId, ProjectForm};

#[derive(Parser)]
#[command(name = "kamotsu", about = "軽貨物掲示板 (light-freight bulletin board)")]
struct Cli {
    /// Board data file (default: <data dir>/kamotsu/board.json).
    #[arg(long, env = "KAMOTSU_DATA_FILE", global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Set the nickname posts are made under.
    Nickname { name: String },
    /// Create a verified account for this session.
    #[command(subcommand)]
    Account(AccountCommand),
    /// Forget the session nickname and account.
    Logout,
    /// Show the session nickname and account.
    Whoami,
    /// Post to a channel.
    #[command(subcommand)]
    Post(PostCommand),
    /// Reply in a project posting's thread.
    Comment { message_id: String, text: String },
    /// List messages, optionally for one channel (案件/雑談/詐欺 or project/chat/scam).
    List { channel: Option<Channel> },
    /// Show a project posting with its comments.
    Thread { message_id: String },
    /// Show the account behind a nickname. Requires an account.
    ViewAccount { nickname: String },
    /// Show the rate-limit status for a channel.
    Status { channel: Channel },
    /// Count down until a channel's rate-limit block clears.
    Wait { channel: Channel },
}

#[derive(Subcommand)]
enum AccountCommand {
    /// 法人 (company) account.
    Company {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        representative_name: Option<String>,
        #[arg(long)]
        driver_count: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// 個人ドライバー (independent driver) account.
    Driver {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum PostCommand {
    /// Job listing in 案件. Not rate limited.
    Project {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Line in 雑談.
    Chat { text: String },
    /// Line in 詐欺 (scam alerts).
    Scam { text: String },
}

impl AccountCommand {
    fn into_form(self) -> AccountForm {
        match self {
            AccountCommand::Company {
                nickname,
                company_name,
                representative_name,
                driver_count,
                phone,
                email,
            } => AccountForm {
                nickname: nickname.unwrap_or_default(),
                company_name: company_name.unwrap_or_default(),
                representative_name: representative_name.unwrap_or_default(),
                driver_count: driver_count.unwrap_or_default(),
                phone_number: phone.unwrap_or_default(),
                email: email.unwrap_or_default(),
                ..AccountForm::new(AccountKind::Company)
            },
            AccountCommand::Driver {
                nickname,
                name,
                age,
                phone,
                email,
            } => AccountForm {
                nickname: nickname.unwrap_or_default(),
                name: name.unwrap_or_default(),
                age: age.unwrap_or_default(),
                phone_number: phone.unwrap_or_default(),
                email: email.unwrap_or_default(),
                ..AccountForm::new(AccountKind::Driver)
            },
        }
    }
}

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kamotsu")
        .join("board.json")
}

type CliBoard = Board<FileStore>;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = cli.data_file.unwrap_or_else(default_data_file);
    tracing::debug!("opening board at {}", path.display());
    let board = Board::with_system_clock(FileStore::open(&path));

    match run(board, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(e: &BoardError) {
    match e {
        BoardError::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{field}: {message}");
            }
        }
        BoardError::NicknameRequired => {
            eprintln!("{e}");
            eprintln!("`kamotsu nickname <名前>` で設定できます");
        }
        other => eprintln!("{other}"),
    }
}

async fn run(mut board: CliBoard, command: Command) -> Result<(), BoardError> {
    match command {
        Command::Nickname { name } => {
            let nickname = board.setup_nickname(&name)?;
            println!("ニックネームを「{nickname}」に設定しました");
        }
        Command::Account(account) => {
            let account = board.create_account(&account.into_form())?;
            println!("アカウントを作成しました");
            println!("{}", render::account(&account));
        }
        Command::Logout => {
            board.logout()?;
            println!("ログアウトしました");
        }
        Command::Whoami => {
            let identity = board.identity();
            match identity.nickname() {
                None => println!("ニックネーム未設定"),
                Some(nickname) => match identity.account() {
                    Some(account) => println!("{}", render::account(account)),
                    None => println!("{nickname} (アカウントなし)"),
                },
            }
        }
        Command::Post(post) => {
            let message = match post {
                PostCommand::Project {
                    name,
                    phone,
                    price,
                    description,
                } => {
                    let form = ProjectForm {
                        project_name: name.unwrap_or_default(),
                        phone_number: phone.unwrap_or_default(),
                        price: price.unwrap_or_default(),
                        description: description.unwrap_or_default(),
                    };
                    board.post_project(&form)?
                }
                PostCommand::Chat { text } => board.post_simple(Channel::Chat, &text)?,
                PostCommand::Scam { text } => board.post_simple(Channel::ScamAlert, &text)?,
            };
            println!("{}", render::message(&message, &Local));
        }
        Command::Comment { message_id, text } => {
            let comment = board.add_comment(&MessageId(message_id.clone()), &text)?;
            println!("[{message_id}] にコメントしました ({})", comment.id);
        }
        Command::List { channel } => {
            let channels = match channel {
                Some(channel) => vec![channel],
                None => Channel::ALL.to_vec(),
            };
            for channel in channels {
                println!("── {channel} ──");
                let mut empty = true;
                for message in board.messages(channel) {
                    println!("{}", render::message(message, &Local));
                    empty = false;
                }
                if empty {
                    println!("(投稿はまだありません)");
                }
            }
        }
        Command::Thread { message_id } => {
            let id = MessageId(message_id);
            let message = board
                .message(&id)
                .ok_or_else(|| BoardError::MessageNotFound(id.clone()))?;
            let project = message
                .as_project()
                .ok_or_else(|| BoardError::NotAProjectMessage(id.clone()))?;
            println!("{}", render::thread(project, &Local));
        }
        Command::ViewAccount { nickname } => {
            println!("{}", render::account(board.view_account(&nickname)?));
        }
        Command::Status { channel } => {
            println!("{channel}: {}", render::block_status(board.rate_limit_status(channel)));
        }
        Command::Wait { channel } => wait(board, channel).await,
    }
    Ok(())
}

async fn wait(board: CliBoard, channel: Channel) {
    let board = Arc::new(Mutex::new(board));
    let ticker = BlockTicker::spawn(board, channel);
    let mut updates = ticker.subscribe();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    eprintln!("カウントダウンを終了しました");
                    break;
                }
                let remaining = *updates.borrow_and_update();
                match remaining {
                    Some(0) => {
                        println!("{channel}: 投稿できます");
                        break;
                    }
                    Some(secs) => println!("{channel}: あと{secs}秒"),
                    None => {}
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
}
