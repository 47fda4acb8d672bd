use std::sync::Arc;

use anyhow::{bail, Context, Result};

use blogterm::cli::{Command, Flags};
use blogterm::controllers::{
    gate, post_controller, session_controller, start_app, story_controller, Access, Route,
};
use blogterm::logging;
use blogterm::models::config::{app_dir, Config};
use blogterm::models::storage::SESSION_FILE;
use blogterm::models::{BlogApi, FileStorage, HttpApi, PostRepository, SessionStore, StoryRepository};

/// Settle the session and make sure it may open `route`.
async fn require(route: Route, session: &mut SessionStore<FileStorage>, api: &dyn BlogApi) -> Result<()> {
    session.start(api).await;
    match gate(route, session) {
        Access::Allow(_) => Ok(()),
        Access::Redirect(_) | Access::Pending => {
            bail!("Not logged in. Run `blogterm login` first.")
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    //Get Flags
    let flags = Flags::from_args();

    if let Err(e) = logging::init() {
        eprintln!("Logging disabled: {}", e);
    }

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = &flags.api_url {
        config = config.with_api_url(url.clone());
    }
    log::info!("using blog service at {}", config.api_url);

    let api: Arc<dyn BlogApi> = Arc::new(HttpApi::new(&config)?);
    let storage = FileStorage::open(app_dir()?.join(SESSION_FILE))
        .context("Failed to open session storage")?;
    let mut session = SessionStore::new(storage);

    let posts = |session: &SessionStore<FileStorage>| {
        PostRepository::new(Arc::clone(&api), session.token().map(str::to_string))
    };

    match flags.command() {
        Command::Tui => start_app(Arc::clone(&api), session, config).await?,
        Command::Login { email } => {
            session_controller::login(api.as_ref(), &mut session, email).await?
        }
        Command::Register { username, email } => {
            session_controller::register(api.as_ref(), &mut session, username, email).await?
        }
        Command::Logout => session_controller::logout(&mut session),
        Command::List => {
            require(Route::Dashboard, &mut session, api.as_ref()).await?;
            post_controller::list_posts(&posts(&session), config.excerpt_chars).await?
        }
        Command::Show { id } => {
            session.bootstrap();
            post_controller::show_post(&posts(&session), &id, &config.api_url).await?
        }
        Command::Create(compose) => {
            require(Route::Create, &mut session, api.as_ref()).await?;
            post_controller::create_post(&posts(&session), &compose).await?
        }
        Command::Edit { id, compose, video } => {
            require(Route::Edit(id.clone()), &mut session, api.as_ref()).await?;
            post_controller::edit_post(&posts(&session), &id, &compose, video).await?
        }
        Command::Delete { id, yes } => {
            require(Route::Dashboard, &mut session, api.as_ref()).await?;
            let user = session.user().cloned().context("Not logged in")?;
            post_controller::delete_post(&posts(&session), &user, &id, yes).await?
        }
        Command::Stories => {
            require(Route::Stories, &mut session, api.as_ref()).await?;
            let repo = StoryRepository::new(Arc::clone(&api), session.token().map(str::to_string));
            story_controller::list_stories(&repo).await?
        }
        Command::Story { image, caption } => {
            require(Route::Stories, &mut session, api.as_ref()).await?;
            let repo = StoryRepository::new(Arc::clone(&api), session.token().map(str::to_string));
            story_controller::create_story(&repo, image, caption).await?
        }
    }

    Ok(())
}
