use std::path::PathBuf;
use std::sync::Arc;

use folio_core::{
    load_document, AssetLoader, Control, DocumentDecoder, LoadedDocument, OpenRequest, PixelSurface,
    RenderJob, RenderOutcome, StatusMessage, ViewerConfig, ViewerError, ViewerSession,
};
use iced::widget::image::Handle;
use iced::widget::{button, column, container, horizontal_space, image as img, row, scrollable, text, text_input};
use iced::{keyboard, Element, Length, Subscription, Task, Theme};

use crate::cli::title_from_locator;
use crate::download;

pub fn run(
    config: ViewerConfig,
    loader: AssetLoader,
    decoder: Arc<dyn DocumentDecoder>,
    initial: Option<OpenRequest>,
) -> anyhow::Result<()> {
    iced::application("Folio", FolioApp::update, FolioApp::view)
        .theme(|_| Theme::Dark)
        .subscription(FolioApp::subscription)
        .run_with(move || FolioApp::new(config, loader, decoder, initial))?;
    Ok(())
}

#[derive(Debug, Clone)]
pub enum Message {
    LocatorChanged(String),
    OpenTyped,
    Open(OpenRequest),
    Opened(u64, Result<LoadedDocument, Arc<ViewerError>>),
    Rendered(RenderOutcome),
    Control(Control),
    Download,
    Downloaded(Result<PathBuf, String>),
}

struct FolioApp {
    session: ViewerSession<PixelSurface>,
    loader: Arc<AssetLoader>,
    decoder: Arc<dyn DocumentDecoder>,
    frame: Option<Handle>,
    locator_input: String,
    /// Sequence number of the open in progress; older results are ignored.
    opening: Option<u64>,
    open_seq: u64,
    notice: Option<String>,
}

impl FolioApp {
    fn new(
        config: ViewerConfig,
        loader: AssetLoader,
        decoder: Arc<dyn DocumentDecoder>,
        initial: Option<OpenRequest>,
    ) -> (Self, Task<Message>) {
        let app = Self {
            session: ViewerSession::new(config, PixelSurface::new()),
            loader: Arc::new(loader),
            decoder,
            frame: None,
            locator_input: String::new(),
            opening: None,
            open_seq: 0,
            notice: None,
        };
        let task = initial.map_or_else(Task::none, |request| Task::done(Message::Open(request)));
        (app, task)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LocatorChanged(value) => {
                self.locator_input = value;
            }
            Message::OpenTyped => {
                let locator = self.locator_input.trim().to_string();
                if !locator.is_empty() {
                    let title = title_from_locator(&locator);
                    return self.update(Message::Open(OpenRequest::new(locator, title)));
                }
            }
            Message::Open(request) => {
                self.session.begin_open(&request);
                self.notice = None;
                let locator = match self.session.resolve(&request.locator) {
                    Ok(locator) => locator,
                    Err(e) => {
                        self.session.open_failed(&e);
                        return Task::none();
                    }
                };

                self.open_seq += 1;
                let seq = self.open_seq;
                self.opening = Some(seq);
                let loader = Arc::clone(&self.loader);
                let decoder = Arc::clone(&self.decoder);
                let title = request.display_title;
                return Task::perform(
                    async move {
                        load_document(loader.as_ref(), decoder.as_ref(), locator, title)
                            .await
                            .map_err(Arc::new)
                    },
                    move |result| Message::Opened(seq, result),
                );
            }
            Message::Opened(seq, result) => {
                if self.opening != Some(seq) {
                    tracing::debug!(seq, "ignoring superseded open");
                    return Task::none();
                }
                self.opening = None;
                match result {
                    Ok(loaded) => {
                        let job = self.session.install(loaded);
                        self.frame = None;
                        return render(job);
                    }
                    Err(e) => self.session.open_failed(&e),
                }
            }
            Message::Rendered(outcome) => {
                let next = self.session.finish_render(outcome);
                self.refresh_frame();
                if let Some(job) = next {
                    return render(job);
                }
            }
            Message::Control(control) => {
                if control == Control::Close {
                    if self.opening.take().is_some() {
                        self.session.cancel_open();
                    }
                    self.notice = None;
                }
                let job = self.session.apply(control);
                self.refresh_frame();
                if let Some(job) = job {
                    return render(job);
                }
            }
            Message::Download => {
                if let Some(target) = self.session.download() {
                    let loader = Arc::clone(&self.loader);
                    let dir = self.session.config().download_dir();
                    return Task::perform(
                        async move {
                            download::save(loader.as_ref(), &target, &dir)
                                .await
                                .map_err(|e| format!("{e:#}"))
                        },
                        Message::Downloaded,
                    );
                }
            }
            Message::Downloaded(result) => match result {
                Ok(path) => {
                    tracing::info!(path = %path.display(), "saved document");
                    self.notice = Some(format!("Saved {}", path.display()));
                }
                Err(e) => {
                    tracing::error!("Failed to save PDF: {}", e);
                    self.notice = Some(format!("Download failed: {e}"));
                }
            },
        }
        Task::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(key_to_message)
    }

    /// Whether previous and next would move. Follows the cursor, not the label.
    fn navigation(&self) -> (bool, bool) {
        let current = self.session.current_page();
        let total = self.session.page_count().unwrap_or(1);
        (current > 1, current < total)
    }

    fn refresh_frame(&mut self) {
        self.frame = self
            .session
            .surface()
            .frame()
            .map(|(width, height, pixels)| Handle::from_rgba(width, height, pixels.to_vec()));
    }

    fn view(&self) -> Element<Message> {
        let status = self.session.status();
        let message_line = match &status.message {
            StatusMessage::None => None,
            StatusMessage::Loading { title } => Some(text(format!("Loading {title}...")).size(14)),
            StatusMessage::Error(e) => Some(text(e.clone()).size(14)),
        };

        if !self.session.is_open() {
            // Welcome screen
            let mut welcome = column![
                text("Folio").size(32),
                text("Open a project PDF by URL or path").size(16),
                row![
                    text_input("assets/pdf/project.pdf", &self.locator_input)
                        .on_input(Message::LocatorChanged)
                        .on_submit(Message::OpenTyped)
                        .width(Length::Fixed(360.0)),
                    button("Open PDF").on_press(Message::OpenTyped),
                ]
                .spacing(10),
            ]
            .spacing(20)
            .align_x(iced::Alignment::Center);
            if let Some(line) = message_line {
                welcome = welcome.push(line);
            }

            return container(welcome)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        }

        let page = status.page.unwrap_or(self.session.current_page());
        let total = status.total_pages.unwrap_or(1);
        let (can_go_back, can_go_forward) = self.navigation();
        let toolbar = row![
            text(self.session.title().unwrap_or("Untitled").to_string()).size(18),
            horizontal_space(),
            button("−").on_press(Message::Control(Control::ZoomOut)),
            text(status.zoom_label()),
            button("+").on_press(Message::Control(Control::ZoomIn)),
            horizontal_space(),
            button("◀").on_press_maybe(can_go_back.then_some(Message::Control(Control::PreviousPage))),
            text(format!("Page {page} of {total}")),
            button("▶").on_press_maybe(can_go_forward.then_some(Message::Control(Control::NextPage))),
            horizontal_space(),
            button("Download").on_press(Message::Download),
            button("×").on_press(Message::Control(Control::Close)),
        ]
        .spacing(10)
        .padding(10);

        // Render current page
        let page_view = match &self.frame {
            Some(handle) => scrollable(container(img(handle.clone()).width(Length::Shrink)).center_x(Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill),
            None => scrollable(
                container(text("Rendering page..."))
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .center_x(Length::Fill)
                    .center_y(Length::Fill),
            )
            .width(Length::Fill)
            .height(Length::Fill),
        };

        let mut content = column![toolbar, page_view].spacing(10).padding(10);
        if let Some(line) = message_line {
            content = content.push(line);
        }
        if let Some(notice) = &self.notice {
            content = content.push(text(notice.clone()).size(14));
        }
        content.into()
    }
}

fn render(job: RenderJob) -> Task<Message> {
    Task::perform(job.run(), Message::Rendered)
}

fn key_to_message(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    let name = match &key {
        keyboard::Key::Named(keyboard::key::Named::ArrowLeft) => "ArrowLeft",
        keyboard::Key::Named(keyboard::key::Named::ArrowRight) => "ArrowRight",
        keyboard::Key::Named(keyboard::key::Named::Escape) => "Escape",
        keyboard::Key::Character(c) => c.as_str(),
        _ => return None,
    };
    Control::from_key(name).map(Message::Control)
}
