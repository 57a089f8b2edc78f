pub mod command;
pub mod render;

use log::{ debug, info, warn };
use std::error::Error;
use std::time::Duration;
use tokio::io::{ AsyncBufReadExt, BufReader };
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{ interval_at, Instant };

use crate::session::{ SessionController, SessionEvent };
use crate::voice::RecognitionUpdate;

pub use self::command::{ Command, ParseCommandError, HELP };

/// Line-oriented front end. Owns the controller and prints whatever it emits.
pub struct Terminal {
    controller: SessionController,
    events: UnboundedReceiver<SessionEvent>,
    recognition: UnboundedReceiver<RecognitionUpdate>,
    refresh_interval: Option<Duration>,
}

impl Terminal {
    pub fn new(
        controller: SessionController,
        events: UnboundedReceiver<SessionEvent>,
        recognition: UnboundedReceiver<RecognitionUpdate>,
        refresh_interval: Option<Duration>
    ) -> Self {
        Self { controller, events, recognition, refresh_interval }
    }

    fn print_timeline(&self) {
        for message in self.controller.timeline().messages() {
            println!("{}", render::message(message));
        }
    }

    fn flush(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            let tab = self.controller.view().active_tab;
            if let Some(text) = render::event(&event, tab) {
                println!("{}", text);
            }
            if event == SessionEvent::SessionEnded {
                self.print_timeline();
            }
        }
    }

    pub async fn run(mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.print_timeline();
        self.controller.restore().await;
        self.flush();
        if !self.controller.is_authenticated() {
            println!("Sign in with /login <user> <password> or /register. Type /help for more.");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let period = self.refresh_interval.unwrap_or(Duration::from_secs(3600));
        let mut ticker = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("stdin closed, leaving");
                        break;
                    };
                    match line.parse::<Command>() {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.dispatch(command).await,
                        Err(e) => println!("! {}", e),
                    }
                }
                Some(event) = self.recognition.recv() => {
                    self.controller.handle_recognition(event).await;
                }
                _ = ticker.tick(), if self.refresh_interval.is_some() => {
                    debug!("Periodic dashboard refresh");
                    self.controller.refresh_dashboard().await;
                }
            }
            self.flush();
        }

        info!("Client session {} finished", self.controller.client_session_id());
        Ok(())
    }

    async fn dispatch(&mut self, command: Command) {
        let controller = &mut self.controller;
        match command {
            Command::Say(text) if text.trim().is_empty() => {
                if !controller.view().composer.is_empty() {
                    controller.send_composer().await;
                }
            }
            Command::Say(text) => {
                if !controller.is_authenticated() {
                    println!("! Please sign in first.");
                    return;
                }
                if controller.is_pending() {
                    println!("! Still waiting for the last reply.");
                    return;
                }
                controller.set_composer(text);
                controller.send_composer().await;
            }
            Command::Login { username, password } => {
                if let Err(e) = controller.login(&username, &password).await {
                    debug!("Login refused: {}", e);
                }
            }
            Command::Register { username, password, email } => {
                if let Err(e) = controller.register(&username, &password, &email).await {
                    debug!("Registration refused: {}", e);
                }
            }
            Command::ToggleAuthMode => {
                controller.toggle_auth_mode();
                println!("Auth mode: {:?}", controller.view().auth_mode);
            }
            Command::Logout => controller.logout().await,
            Command::Tab(tab) => {
                println!("== {} ==", tab);
                controller.switch_tab(tab).await;
            }
            Command::Attach(Some(note)) => {
                controller.attach_prescription(note);
                println!("Prescription note attached to your next message.");
            }
            Command::Attach(None) => {
                controller.toggle_attachment_panel();
                let state = if controller.view().attachment_panel_open { "open" } else { "closed" };
                println!("Attachment panel {}.", state);
            }
            Command::Discard => {
                controller.discard_prescription();
                println!("Prescription note discarded.");
            }
            Command::Refill(n) => {
                let alert = controller.dashboard().refill_alerts.get(n - 1).cloned();
                match alert {
                    Some(alert) => {
                        controller.draft_refill(&alert);
                        println!(
                            "Draft: \"{}\". Press Enter to send it.",
                            controller.view().composer
                        );
                    }
                    None => println!("! No refill alert #{}.", n),
                }
            }
            Command::Email(email) => {
                controller.update_email(&email).await;
            }
            Command::Voice => {
                if controller.start_listening().is_ok() {
                    println!("Listening...");
                }
            }
            Command::Refresh => {
                controller.refresh_dashboard().await;
                controller.check_health().await;
                let view = controller.view();
                if !view.active_tab.uses_dashboard() {
                    println!("{}", render::dashboard(controller.dashboard()));
                }
                if view.email_service_live {
                    println!("Backend: {:?}, email alerts live.", view.api_status);
                } else {
                    warn!("Email alert service is not live");
                    println!("Backend: {:?}.", view.api_status);
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }
}
