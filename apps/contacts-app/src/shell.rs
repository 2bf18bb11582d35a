//! Line-oriented session over the contacts module.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use contacts::model::{ContactDraft, ProfileUpdate, Registration};
use contacts::{ContactsModule, InMemoryBackends};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "\
commands:
  register <name> <email> <phone> <password>
  login <email> <password> [remember]
  logout
  whoami
  add <name> <phone> <email> [picture-file]
  edit <id> <name> <phone> <email> [picture-file]
  show <id>
  delete <id>
  list
  search [text]
  refresh
  profile <name> <email> <phone>
  password <new> <confirm>
  reset <email>
  quit";

enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    module: ContactsModule,
    backends: InMemoryBackends,
}

impl Shell {
    pub fn new(module: ContactsModule, backends: InMemoryBackends) -> Self {
        Self { module, backends }
    }

    /// Execute commands from `input` until it ends or `quit` is read.
    /// Command failures are reported on `out` and do not stop the session.
    pub async fn run<R, W>(&self, input: R, mut out: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "contacts shell, type 'help' for commands")?;
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match self.execute(line, &mut out).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => writeln!(out, "error: {e}")?,
            }
            out.flush()?;
        }
        Ok(())
    }

    async fn execute<W: Write>(&self, line: &str, out: &mut W) -> Result<Flow> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let (command, args) = match words.split_first() {
            Some((c, rest)) => (*c, rest),
            None => return Ok(Flow::Continue),
        };
        let account = self.module.account();
        let contacts = self.module.contacts();
        let vm = self.module.view_model();

        match (command, args) {
            ("help", _) => writeln!(out, "{HELP}")?,
            ("quit" | "exit", _) => return Ok(Flow::Quit),

            ("register", [name, email, phone, password]) => {
                account
                    .register(Registration {
                        name: name.to_string(),
                        email: email.to_string(),
                        phone: phone.to_string(),
                        password: password.to_string(),
                    })
                    .await?;
                writeln!(out, "welcome, {}", vm.display_name())?;
            }
            ("login", [email, password, rest @ ..]) => {
                let remember = matches!(rest, ["remember"]);
                account.login(email, password, remember).await?;
                writeln!(out, "welcome, {}", vm.display_name())?;
            }
            ("logout", []) => {
                account.logout().await;
                writeln!(out, "signed out")?;
            }
            ("whoami", []) => match vm.owner_id() {
                Some(uid) => writeln!(out, "{} ({uid})", vm.display_name())?,
                None => writeln!(out, "not signed in")?,
            },

            ("add", [name, phone, email, picture @ ..]) => {
                let draft = self.draft(name, phone, email, picture).await?;
                let saved = contacts.save_contact(None, draft).await?;
                writeln!(out, "saved {}", saved.id)?;
                if let Some(warning) = saved.image_warning {
                    writeln!(out, "warning: {warning}")?;
                }
            }
            ("edit", [id, name, phone, email, picture @ ..]) => {
                let draft = self.draft(name, phone, email, picture).await?;
                let saved = contacts.save_contact(Some(*id), draft).await?;
                writeln!(out, "updated {}", saved.id)?;
                if let Some(warning) = saved.image_warning {
                    writeln!(out, "warning: {warning}")?;
                }
            }
            ("show", [id]) => {
                let contact = contacts.load_contact(id).await?;
                writeln!(out, "name:  {}", contact.name)?;
                writeln!(out, "phone: {}", contact.phone)?;
                writeln!(out, "email: {}", contact.email)?;
                match contacts.contact_image(&contact) {
                    Some(bytes) => writeln!(out, "picture: {} bytes", bytes.len())?,
                    None => writeln!(out, "picture: none")?,
                }
            }
            ("delete", [id]) => {
                contacts.delete_contact(id).await?;
                writeln!(out, "deleted {id}")?;
            }
            ("list", []) => {
                vm.set_search_query("");
                self.print_contacts(out)?;
            }
            ("search", words) => {
                vm.set_search_query(words.join(" "));
                self.print_contacts(out)?;
            }
            ("refresh", []) => {
                contacts.refresh_contacts().await?;
                writeln!(out, "{} contacts", vm.contacts().len())?;
            }

            ("profile", [name, email, phone]) => {
                let notice = account
                    .update_profile(ProfileUpdate {
                        name: name.to_string(),
                        email: email.to_string(),
                        phone: phone.to_string(),
                    })
                    .await?;
                writeln!(out, "profile saved")?;
                if let Some(notice) = notice {
                    writeln!(out, "{notice}")?;
                }
            }
            ("password", [new, confirm]) => {
                let notice = account.update_password(new, confirm).await?;
                writeln!(out, "{notice}")?;
            }
            ("reset", [email]) => {
                let notice = account.reset_password(email).await?;
                writeln!(out, "{notice}")?;
            }

            (other, _) => bail!("cannot parse '{other}' command, type 'help'"),
        }
        Ok(Flow::Continue)
    }

    async fn draft(
        &self,
        name: &str,
        phone: &str,
        email: &str,
        picture: &[&str],
    ) -> Result<ContactDraft> {
        let image = match picture {
            [] => None,
            [path] => {
                self.backends.camera.point_at(Some(PathBuf::from(path)));
                let captured = self.module.contacts().capture_contact_image().await;
                self.backends.camera.point_at(None);
                Some(captured?)
            }
            _ => bail!("expected at most one picture file"),
        };
        Ok(ContactDraft {
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            image,
        })
    }

    fn print_contacts<W: Write>(&self, out: &mut W) -> Result<()> {
        let visible = self.module.view_model().visible_contacts();
        if visible.is_empty() {
            writeln!(out, "no contacts")?;
        }
        for c in visible {
            let picture = if c.has_image() { " [picture]" } else { "" };
            writeln!(out, "{}  {}  {}  {}{picture}", c.id, c.name, c.phone, c.email)?;
        }
        Ok(())
    }
}
