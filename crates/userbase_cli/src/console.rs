//! Interactive menu loop over the user service.
//!
//! # Responsibility
//! - Prompt for menu choices and record fields, call the service, print
//!   results.
//! - Turn service failures into one-line messages and keep looping.
//!
//! # Invariants
//! - Only `UserRequest` values and ids are handed to the service.
//! - End of input behaves like choosing "exit".

use chrono::NaiveDate;
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use userbase_core::{ServiceError, UserRequest, UserService, UserStore, UserView};

const DATE_INPUT_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Create,
    ReadAll,
    ReadById,
    Update,
    Delete,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 6] = [
        Self::Create,
        Self::ReadAll,
        Self::ReadById,
        Self::Update,
        Self::Delete,
        Self::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Create => "create user",
            Self::ReadAll => "list all users",
            Self::ReadById => "find user by id",
            Self::Update => "update user",
            Self::Delete => "delete user",
            Self::Exit => "exit",
        }
    }

    /// Parses a 1-based menu number.
    fn parse(input: &str) -> Option<Self> {
        let number: usize = input.trim().parse().ok()?;
        Self::ALL.get(number.checked_sub(1)?).copied()
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Console front end bound to one service and one input/output pair.
pub struct Console<'svc, S: UserStore, R, W> {
    service: &'svc UserService<S>,
    input: R,
    output: W,
}

impl<'svc, S: UserStore, R: BufRead, W: Write> Console<'svc, S, R, W> {
    pub fn new(service: &'svc UserService<S>, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs the menu loop until "exit" or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        info!("event=console_start module=cli status=ok");
        loop {
            self.print_menu()?;
            let Some(line) = self.prompt("choose an item: ")? else {
                break;
            };

            let Some(item) = MenuItem::parse(&line) else {
                warn!("event=console_choice module=cli status=rejected");
                writeln!(self.output, "invalid choice, try again")?;
                continue;
            };

            match self.handle(item)? {
                Flow::Continue => {}
                Flow::Exit => break,
            }
        }
        info!("event=console_stop module=cli status=ok");
        Ok(())
    }

    fn handle(&mut self, item: MenuItem) -> io::Result<Flow> {
        match item {
            MenuItem::Create => {
                let Some(request) = self.ask_request()? else {
                    return Ok(Flow::Exit);
                };
                match self.service.create_user(&request) {
                    Ok(view) => writeln!(self.output, "user created: {}", render_view(&view))?,
                    Err(err) => self.report(&err)?,
                }
            }
            MenuItem::ReadAll => match self.service.read_all_users() {
                Ok(views) if views.is_empty() => writeln!(self.output, "no users yet")?,
                Ok(views) => {
                    for view in &views {
                        writeln!(self.output, "{}", render_view(view))?;
                    }
                }
                Err(err) => self.report(&err)?,
            },
            MenuItem::ReadById => {
                let Some(id) = self.ask_id()? else {
                    return Ok(Flow::Exit);
                };
                match self.service.read_user_by_id(id) {
                    Ok(view) => writeln!(self.output, "{}", render_view(&view))?,
                    Err(err) => self.report(&err)?,
                }
            }
            MenuItem::Update => {
                let Some(id) = self.ask_id()? else {
                    return Ok(Flow::Exit);
                };
                let Some(request) = self.ask_request()? else {
                    return Ok(Flow::Exit);
                };
                match self.service.update_user(id, &request) {
                    Ok(view) => writeln!(self.output, "user updated: {}", render_view(&view))?,
                    Err(err) => self.report(&err)?,
                }
            }
            MenuItem::Delete => {
                let Some(id) = self.ask_id()? else {
                    return Ok(Flow::Exit);
                };
                match self.service.delete_user(id) {
                    Ok(()) => writeln!(self.output, "user deleted")?,
                    Err(err) => self.report(&err)?,
                }
            }
            MenuItem::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "menu:")?;
        for (index, item) in MenuItem::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {}", index + 1, item.label())?;
        }
        Ok(())
    }

    /// Returns `None` at end of input.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Unparseable numbers become `None` so the service reports them.
    fn ask_id(&mut self) -> io::Result<Option<Option<i64>>> {
        Ok(self
            .prompt("user id: ")?
            .map(|line| line.trim().parse::<i64>().ok()))
    }

    fn ask_request(&mut self) -> io::Result<Option<UserRequest>> {
        let Some(name) = self.prompt("name: ")? else {
            return Ok(None);
        };
        let Some(age) = self.prompt("age: ")? else {
            return Ok(None);
        };
        let Some(email) = self.prompt("email: ")? else {
            return Ok(None);
        };
        let Some(created_at) = self.prompt("creation date (dd.mm.yyyy): ")? else {
            return Ok(None);
        };

        Ok(Some(UserRequest {
            name: Some(name),
            email: Some(email),
            age: age.trim().parse().ok(),
            created_at: NaiveDate::parse_from_str(created_at.trim(), DATE_INPUT_FORMAT).ok(),
        }))
    }

    fn report(&mut self, err: &ServiceError) -> io::Result<()> {
        match err {
            ServiceError::Validation(_) => {
                warn!("event=console_request module=cli status=rejected error={err}");
                writeln!(self.output, "input error: {err}")
            }
            ServiceError::NotFound(_) => {
                warn!("event=console_request module=cli status=not_found error={err}");
                writeln!(self.output, "not found: {err}")
            }
            ServiceError::Storage(_) => {
                error!("event=console_request module=cli status=error error={err}");
                writeln!(self.output, "unexpected error: {err}")
            }
        }
    }
}

fn render_view(view: &UserView) -> String {
    format!(
        "#{} {} <{}> age={} created={}",
        view.id,
        view.name,
        view.email,
        view.age,
        view.created_at.format(DATE_INPUT_FORMAT)
    )
}
