use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{backend::Backend, layout::Rect, widgets::Paragraph, Frame, Terminal};
use tokio::sync::mpsc;

use crate::controllers::access::{gate, Access, Route};
use crate::controllers::editor_controller::{self, ComposeAction};
use crate::controllers::latest::{LatestRequest, Ticket};
use crate::error::BlogError;
use crate::models::client::BlogApi;
use crate::models::config::Config;
use crate::models::post::Post;
use crate::models::repository::{confirm_delete, PostRepository, StoryRepository};
use crate::models::session::SessionStore;
use crate::models::storage::Storage;
use crate::models::story::Story;
use crate::models::user::Credentials;
use crate::views::auth::{self, AuthMode, AuthView};
use crate::views::compose::{self, ComposeMode, ComposeView};
use crate::views::dashboard::{self, DashboardView, FeedContext};
use crate::views::detail::{self, DetailView};
use crate::views::stories;
use crate::views::tui::{self, TerminalGuard};
use crate::views::widgets::Notices;

const TICK: Duration = Duration::from_millis(250);
const LOADING_HINTS: &str = "q quit";

/// Results of background requests, delivered back to the event loop.
#[derive(Debug)]
pub enum Message {
    Verified { token: String, result: Result<(), BlogError> },
    SignedIn(Result<Credentials, BlogError>),
    Posts(Ticket, Result<Vec<Post>, BlogError>),
    Stories(Ticket, Result<Vec<Story>, BlogError>),
    Post(Ticket, Result<Post, BlogError>),
    Saved { ticket: Ticket, created: bool, result: Result<Post, BlogError> },
    Deleted { post_id: String, result: Result<(), BlogError> },
}

pub enum Screen {
    /// Waiting for the session to settle before entering the route.
    Loading(Route),
    Auth(AuthView),
    Dashboard,
    Detail(DetailView),
    Compose(ComposeView),
    /// Index into the session's stories, drawn over the dashboard.
    Story(usize),
    ConfirmDelete { post_id: String, title: String, back: Box<Screen> },
}

enum Intent {
    Stay,
    Quit,
    Go(Route),
    SubmitAuth,
    Refresh,
    OpenStories,
    NextStory,
    CloseOverlay,
    AskDelete(String),
    Answer(String),
    Save,
    Logout,
    Notice(String),
}

pub struct App<S: Storage> {
    api: Arc<dyn BlogApi>,
    session: SessionStore<S>,
    config: Config,
    screen: Screen,
    dashboard: DashboardView,
    feed: LatestRequest,
    story_feed: LatestRequest,
    detail: LatestRequest,
    save: LatestRequest,
    notices: Notices,
    tx: mpsc::UnboundedSender<Message>,
    should_quit: bool,
}

impl<S: Storage> App<S> {
    pub fn new(
        api: Arc<dyn BlogApi>,
        session: SessionStore<S>,
        config: Config,
        tx: mpsc::UnboundedSender<Message>,
    ) -> Self {
        App {
            api,
            session,
            config,
            screen: Screen::Loading(Route::Dashboard),
            dashboard: DashboardView::new(),
            feed: LatestRequest::new(),
            story_feed: LatestRequest::new(),
            detail: LatestRequest::new(),
            save: LatestRequest::new(),
            notices: Notices::default(),
            tx,
            should_quit: false,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn dashboard(&self) -> &DashboardView {
        &self.dashboard
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Restore the stored session, start verifying it, and open the dashboard.
    pub fn start(&mut self) {
        if let Some(token) = self.session.bootstrap() {
            let api = Arc::clone(&self.api);
            self.spawn(async move {
                let result = api.verify_session(&token).await;
                Message::Verified { token, result }
            });
        }
        self.navigate(Route::Dashboard);
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(task.await);
        });
    }

    fn posts(&self) -> PostRepository<dyn BlogApi> {
        PostRepository::new(Arc::clone(&self.api), self.session.token().map(str::to_string))
    }

    fn stories(&self) -> StoryRepository<dyn BlogApi> {
        StoryRepository::new(Arc::clone(&self.api), self.session.token().map(str::to_string))
    }

    pub fn navigate(&mut self, route: Route) {
        match gate(route.clone(), &self.session) {
            Access::Allow(route) => self.enter(route),
            Access::Redirect(to) => self.enter(to),
            Access::Pending => self.screen = Screen::Loading(route),
        }
    }

    fn enter(&mut self, route: Route) {
        log::debug!("entering {:?}", route);
        if let Route::Edit(id) = &route {
            if let Err(message) = self.owned_post(id, "edit") {
                self.notices.error(message);
                return;
            }
        }

        let leaving = match &self.screen {
            Screen::ConfirmDelete { back, .. } => back.as_ref(),
            screen => screen,
        };
        match leaving {
            Screen::Detail(_) => self.detail.close(),
            Screen::Compose(_) => self.save.close(),
            _ => {}
        }

        match route {
            Route::Login => self.screen = Screen::Auth(AuthView::new(AuthMode::Login)),
            Route::Register => self.screen = Screen::Auth(AuthView::new(AuthMode::Register)),
            Route::Dashboard => {
                self.screen = Screen::Dashboard;
                self.refresh();
            }
            Route::PostDetail(id) => {
                let ticket = self.detail.reopen();
                let repo = self.posts();
                let post_id = id.clone();
                self.spawn(async move { Message::Post(ticket, repo.get_post(&post_id).await) });
                self.screen = Screen::Detail(DetailView::new(id));
            }
            Route::Create => self.screen = Screen::Compose(ComposeView::create()),
            Route::Edit(id) => match self.owned_post(&id, "edit") {
                Ok(post) => {
                    let view = ComposeView::edit(post);
                    self.screen = Screen::Compose(view);
                }
                Err(message) => self.notices.error(message),
            },
            Route::Stories => self.open_stories(),
        }
    }

    fn refresh(&mut self) {
        self.dashboard.loading = true;

        let ticket = self.feed.issue();
        let repo = self.posts();
        self.spawn(async move { Message::Posts(ticket, repo.list_posts().await) });

        let ticket = self.story_feed.issue();
        let repo = self.stories();
        self.spawn(async move { Message::Stories(ticket, repo.list_stories().await) });
    }

    fn find_post(&self, id: &str) -> Option<&Post> {
        let in_detail = match &self.screen {
            Screen::Detail(view) => view.post.as_ref().filter(|p| p.id == id),
            Screen::ConfirmDelete { back, .. } => match back.as_ref() {
                Screen::Detail(view) => view.post.as_ref().filter(|p| p.id == id),
                _ => None,
            },
            _ => None,
        };
        in_detail.or_else(|| self.dashboard.posts.items.iter().find(|p| p.id == id))
    }

    /// The post, if the signed-in user wrote it.
    fn owned_post(&self, id: &str, action: &str) -> Result<&Post, String> {
        let post = self.find_post(id).ok_or_else(|| "Blog not found".to_string())?;
        let owner = self.session.user().is_some_and(|u| post.is_owned_by(&u.user_id));
        if owner {
            Ok(post)
        } else {
            Err(format!("You can only {} your own blogs", action))
        }
    }

    fn open_stories(&mut self) {
        let stories = self.session.stories();
        if stories.is_empty() {
            self.notices.info("No stories yet");
            self.screen = Screen::Dashboard;
            return;
        }
        let index = self
            .session
            .viewed()
            .next_unviewed(stories)
            .and_then(|next| stories.iter().position(|s| s.id == next.id))
            .unwrap_or(0);
        self.show_story(index);
    }

    fn show_story(&mut self, index: usize) {
        let id = self.session.stories().get(index).map(|s| s.id.clone());
        match id {
            Some(id) => {
                self.session.viewed_mut().mark(&id);
                self.screen = Screen::Story(index);
            }
            None => self.screen = Screen::Dashboard,
        }
    }

    /// Report a failed request; auth failures also end the session.
    fn fail(&mut self, err: BlogError) {
        if self.session.handle_error(&err) {
            self.forget_requests();
            self.notices.error("Your session has expired. Please sign in again.");
            self.enter(Route::Login);
        } else {
            self.notices.error(err.notice());
        }
    }

    fn forget_requests(&mut self) {
        self.feed.invalidate();
        self.story_feed.invalidate();
        self.detail.invalidate();
        self.dashboard.posts.set_items(Vec::new());
    }

    pub fn handle(&mut self, message: Message) {
        match message {
            Message::Verified { token, result } => {
                let accepted = result.is_ok();
                self.session.complete_verification(&token, result);
                if !accepted && !self.session.is_authenticated() {
                    self.feed.invalidate();
                    self.story_feed.invalidate();
                    self.dashboard.posts.set_items(Vec::new());
                    self.notices.error("Your session has expired. Please sign in again.");
                    if !matches!(self.screen, Screen::Detail(_) | Screen::Auth(_)) {
                        self.enter(Route::Login);
                    }
                } else if let Screen::Loading(route) = &self.screen {
                    let route = route.clone();
                    self.navigate(route);
                }
            }
            Message::SignedIn(result) => {
                if let Screen::Auth(view) = &mut self.screen {
                    view.busy = false;
                }
                match result {
                    Ok(credentials) => {
                        let name = credentials.username.clone();
                        self.forget_requests();
                        match self.session.login(credentials) {
                            Ok(()) => self.notices.info(format!("Welcome, {}!", name)),
                            Err(e) => self
                                .notices
                                .error(format!("Signed in, but the session was not saved: {}", e.notice())),
                        }
                        self.navigate(Route::Dashboard);
                    }
                    Err(e) => self.notices.error(e.notice()),
                }
            }
            Message::Posts(ticket, result) => {
                if !self.feed.accepts(ticket) {
                    log::debug!("dropping stale feed response");
                    return;
                }
                self.dashboard.loading = false;
                match result {
                    Ok(posts) => {
                        self.dashboard.error = None;
                        self.dashboard.posts.set_items(posts);
                    }
                    Err(e) => {
                        self.dashboard.error = Some(e.notice());
                        self.fail(e);
                    }
                }
            }
            Message::Stories(ticket, result) => {
                if !self.story_feed.accepts(ticket) {
                    return;
                }
                match result {
                    Ok(stories) => self.session.set_stories(stories),
                    Err(e) => {
                        log::warn!("failed to fetch stories: {}", e);
                        self.fail(e);
                    }
                }
            }
            Message::Post(ticket, result) => {
                if !self.detail.accepts(ticket) {
                    log::debug!("dropping stale post response");
                    return;
                }
                let err = match (&mut self.screen, result) {
                    (Screen::Detail(view), Ok(post)) if post.id != view.post_id => {
                        log::debug!("dropping post {} for detail view of {}", post.id, view.post_id);
                        None
                    }
                    (Screen::Detail(view), Ok(post)) => {
                        view.post = Some(post);
                        None
                    }
                    (Screen::Detail(view), Err(e)) => {
                        view.error = Some(e.notice());
                        Some(e)
                    }
                    _ => None,
                };
                if let Some(e) = err {
                    self.fail(e);
                }
            }
            Message::Saved { ticket, created, result } => {
                if !self.save.accepts(ticket) {
                    log::debug!("dropping save result for a closed compose screen");
                    return;
                }
                if let Screen::Compose(view) = &mut self.screen {
                    view.saving = false;
                }
                match result {
                    Ok(post) if created => {
                        self.notices.info("Blog created successfully!");
                        self.navigate(Route::Dashboard);
                        log::debug!("new post {}", post.id);
                    }
                    Ok(post) => {
                        self.notices.info("Blog updated successfully!");
                        self.navigate(Route::PostDetail(post.id));
                    }
                    Err(e) => self.fail(e),
                }
            }
            Message::Deleted { post_id, result } => match result {
                Ok(()) => {
                    let remaining = self
                        .dashboard
                        .posts
                        .items
                        .drain(..)
                        .filter(|p| p.id != post_id)
                        .collect();
                    self.dashboard.posts.set_items(remaining);
                    self.notices.info("Blog deleted successfully");
                    if matches!(&self.screen, Screen::Detail(view) if view.post_id == post_id) {
                        self.navigate(Route::Dashboard);
                    }
                }
                Err(e) => self.fail(e),
            },
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let intent = match &mut self.screen {
            Screen::Loading(_) => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Intent::Quit,
                _ => Intent::Stay,
            },
            Screen::Auth(view) => auth_key(view, key),
            Screen::Dashboard => dashboard_key(&mut self.dashboard, key),
            Screen::Detail(view) => detail_key(view, key),
            Screen::Compose(view) => match editor_controller::handle_key(view, key) {
                ComposeAction::None => Intent::Stay,
                ComposeAction::Submit => Intent::Save,
                ComposeAction::Notice(message) => Intent::Notice(message),
                ComposeAction::Cancel => Intent::Go(match &view.mode {
                    ComposeMode::Create => Route::Dashboard,
                    ComposeMode::Edit { post_id } => Route::PostDetail(post_id.clone()),
                }),
            },
            Screen::Story(_) => match key.code {
                KeyCode::Char('n') | KeyCode::Right | KeyCode::Char('l') => Intent::NextStory,
                KeyCode::Esc | KeyCode::Char('q') => Intent::CloseOverlay,
                _ => Intent::Stay,
            },
            Screen::ConfirmDelete { .. } => match key.code {
                KeyCode::Char(c) => Intent::Answer(c.to_string()),
                _ => Intent::CloseOverlay,
            },
        };

        self.act(intent);
    }

    fn act(&mut self, intent: Intent) {
        match intent {
            Intent::Stay => {}
            Intent::Quit => self.should_quit = true,
            Intent::Go(route) => self.navigate(route),
            Intent::Refresh => self.refresh(),
            Intent::OpenStories => self.navigate(Route::Stories),
            Intent::NextStory => {
                if let Screen::Story(index) = self.screen {
                    self.show_story(index + 1);
                }
            }
            Intent::CloseOverlay => {
                let screen = std::mem::replace(&mut self.screen, Screen::Dashboard);
                if let Screen::ConfirmDelete { back, .. } = screen {
                    self.screen = *back;
                }
            }
            Intent::AskDelete(id) => match self.owned_post(&id, "delete") {
                Ok(post) => {
                    let title = post.title.clone();
                    let back = std::mem::replace(&mut self.screen, Screen::Dashboard);
                    self.screen = Screen::ConfirmDelete { post_id: id, title, back: Box::new(back) };
                }
                Err(message) => self.notices.error(message),
            },
            Intent::Answer(answer) => {
                let post_id = match &self.screen {
                    Screen::ConfirmDelete { post_id, .. } => post_id.clone(),
                    _ => return,
                };
                self.act(Intent::CloseOverlay);
                if let Some(confirmed) = confirm_delete(&post_id, &answer) {
                    let repo = self.posts();
                    self.spawn(async move {
                        let result = repo.delete_post(confirmed).await;
                        Message::Deleted { post_id, result }
                    });
                }
            }
            Intent::SubmitAuth => self.submit_auth(),
            Intent::Save => self.save(),
            Intent::Logout => {
                self.session.logout();
                self.forget_requests();
                self.notices.info("Logged out");
                self.navigate(Route::Login);
            }
            Intent::Notice(message) => self.notices.error(message),
        }
    }

    fn submit_auth(&mut self) {
        let api = Arc::clone(&self.api);
        let Screen::Auth(view) = &mut self.screen else {
            return;
        };
        if view.busy {
            return;
        }

        match view.mode {
            AuthMode::Login => {
                let request = view.login_request();
                if request.email.is_empty() || request.password.is_empty() {
                    self.notices.error("Email and password are required");
                    return;
                }
                view.busy = true;
                self.spawn(async move { Message::SignedIn(api.login(&request).await) });
            }
            AuthMode::Register => {
                let request = view.register_request();
                if let Err(e) = request.validate() {
                    self.notices.error(e.notice());
                    return;
                }
                view.busy = true;
                self.spawn(async move { Message::SignedIn(api.register(&request).await) });
            }
        }
    }

    fn save(&mut self) {
        let repo = self.posts();
        let Screen::Compose(view) = &mut self.screen else {
            return;
        };
        if view.saving {
            return;
        }

        match &view.mode {
            ComposeMode::Create => {
                let post = view.new_post();
                if let Err(e) = post.validate() {
                    self.notices.error(e.notice());
                    return;
                }
                view.saving = true;
                let ticket = self.save.reopen();
                self.spawn(async move {
                    Message::Saved { ticket, created: true, result: repo.create_post(&post).await }
                });
            }
            ComposeMode::Edit { post_id } => {
                let update = view.update();
                if let Err(e) = update.validate() {
                    self.notices.error(e.notice());
                    return;
                }
                let post_id = post_id.clone();
                view.saving = true;
                let ticket = self.save.reopen();
                self.spawn(async move {
                    Message::Saved { ticket, created: false, result: repo.update_post(&post_id, &update).await }
                });
            }
        }
    }

    pub fn draw<B: Backend>(&mut self, f: &mut Frame<B>) {
        let (main, status) = tui::split_status(f.size());
        let ctx = FeedContext {
            user: self.session.user(),
            stories: self.session.stories(),
            viewed: self.session.viewed(),
            excerpt_chars: self.config.excerpt_chars,
        };
        let hints = draw_screen(f, main, &mut self.screen, &mut self.dashboard, &ctx, &self.config.api_url);
        tui::render_status(f, status, &self.notices, hints);
    }

    pub fn tick(&mut self) {
        self.notices.expire(Instant::now());
    }
}

fn auth_key(view: &mut AuthView, key: KeyEvent) -> Intent {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('r') && !view.busy {
            view.switch_mode();
        }
        return Intent::Stay;
    }
    match key.code {
        KeyCode::Esc => return Intent::Quit,
        KeyCode::Enter => return Intent::SubmitAuth,
        KeyCode::Tab | KeyCode::Down => view.focus_next(),
        KeyCode::Backspace => {
            view.focused_mut().pop();
        }
        KeyCode::Char(c) => view.focused_mut().push(c),
        _ => {}
    }
    Intent::Stay
}

fn dashboard_key(view: &mut DashboardView, key: KeyEvent) -> Intent {
    let selected = view.posts.selected().map(|p| p.id.clone());
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Intent::Quit,
        KeyCode::Down | KeyCode::Char('j') => {
            view.posts.next();
            Intent::Stay
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view.posts.previous();
            Intent::Stay
        }
        KeyCode::Home | KeyCode::Char('g') => {
            view.posts.first();
            Intent::Stay
        }
        KeyCode::End | KeyCode::Char('G') => {
            view.posts.last();
            Intent::Stay
        }
        KeyCode::Enter => selected.map_or(Intent::Stay, |id| Intent::Go(Route::PostDetail(id))),
        KeyCode::Char('e') => selected.map_or(Intent::Stay, |id| Intent::Go(Route::Edit(id))),
        KeyCode::Char('d') => selected.map_or(Intent::Stay, Intent::AskDelete),
        KeyCode::Char('n') => Intent::Go(Route::Create),
        KeyCode::Char('s') => Intent::OpenStories,
        KeyCode::Char('r') => Intent::Refresh,
        KeyCode::Char('L') => Intent::Logout,
        _ => Intent::Stay,
    }
}

fn detail_key(view: &mut DetailView, key: KeyEvent) -> Intent {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => view.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => view.scroll_up(),
        KeyCode::Char('e') => return Intent::Go(Route::Edit(view.post_id.clone())),
        KeyCode::Char('d') => return Intent::AskDelete(view.post_id.clone()),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => return Intent::Go(Route::Dashboard),
        _ => {}
    }
    Intent::Stay
}

fn draw_screen<B: Backend>(
    f: &mut Frame<B>,
    area: Rect,
    screen: &mut Screen,
    dashboard: &mut DashboardView,
    ctx: &FeedContext,
    api_url: &str,
) -> &'static str {
    match screen {
        Screen::Loading(_) => {
            f.render_widget(Paragraph::new("Loading..."), area);
            LOADING_HINTS
        }
        Screen::Auth(view) => {
            auth::render_auth(f, area, view);
            auth::HINTS
        }
        Screen::Dashboard => {
            dashboard::render_dashboard(f, area, dashboard, ctx);
            dashboard::HINTS
        }
        Screen::Detail(view) => {
            detail::render_detail(f, area, view, api_url);
            detail::HINTS
        }
        Screen::Compose(view) => {
            compose::render_compose(f, area, view);
            if view.editing {
                compose::EDITING_HINTS
            } else {
                compose::HINTS
            }
        }
        Screen::Story(index) => {
            dashboard::render_dashboard(f, area, dashboard, ctx);
            if let Some(story) = ctx.stories.get(*index) {
                stories::render_story(f, area, story);
            }
            stories::STORY_HINTS
        }
        Screen::ConfirmDelete { title, back, .. } => {
            draw_screen(f, area, back, dashboard, ctx, api_url);
            stories::render_confirm_delete(f, area, title);
            stories::CONFIRM_HINTS
        }
    }
}

pub async fn run_app<B: Backend, S: Storage>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    rx: &mut mpsc::UnboundedReceiver<Message>,
) -> Result<(), BlogError> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        terminal.draw(|f| app.draw(f))?;
        if app.should_quit() {
            return Ok(());
        }

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.on_key(key),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            Some(message) = rx.recv() => app.handle(message),
            _ = tick.tick() => app.tick(),
        }
    }
}

pub async fn start_app<S: Storage>(
    api: Arc<dyn BlogApi>,
    session: SessionStore<S>,
    config: Config,
) -> Result<(), BlogError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(api, session, config, tx);
    app.start();

    let mut guard = TerminalGuard::acquire()?;
    run_app(guard.terminal(), &mut app, &mut rx).await
}
