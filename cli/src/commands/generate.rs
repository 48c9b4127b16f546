//! Generate command implementation.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Subcommand};
use qrforge_core::payload::{PayloadRequest, WifiSecurity};
use qrforge_core::store::User;
use qrforge_core::{render, style, CapacityEstimate, EccLevel, Store, StyleOptions};

use crate::ui::{print_banner, print_qr_code};

/// Style flags shared by `generate` and `favorites save`.
#[derive(Args)]
pub struct StyleFlags {
    /// Foreground color (palette name or #RRGGBB)
    #[arg(long)]
    pub fg: Option<String>,

    /// Background color (palette name or #RRGGBB)
    #[arg(long)]
    pub bg: Option<String>,

    /// Pixel size of each module
    #[arg(long)]
    pub module_size: Option<u32>,

    /// Quiet zone width in modules
    #[arg(long)]
    pub border: Option<u32>,

    /// Error correction level: L, M, Q or H
    #[arg(long)]
    pub ecc: Option<String>,
}

impl StyleFlags {
    /// Apply the given flags on top of a base style.
    pub fn apply(&self, mut base: StyleOptions) -> anyhow::Result<StyleOptions> {
        if let Some(fg) = &self.fg {
            base.fg = style::resolve_color(fg)?;
        }
        if let Some(bg) = &self.bg {
            base.bg = style::resolve_color(bg)?;
        }
        if let Some(module_size) = self.module_size {
            base.module_size = module_size;
        }
        if let Some(border) = self.border {
            base.border = border;
        }
        if let Some(ecc) = &self.ecc {
            base.ecc = EccLevel::parse(ecc)?;
        }
        Ok(base)
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    content: Content,

    /// Start from a built-in template
    #[arg(long)]
    template: Option<String>,

    /// Start from a saved favorite (requires login)
    #[arg(long)]
    favorite: Option<String>,

    #[command(flatten)]
    style: StyleFlags,

    /// Embed a logo image at the center of the symbol
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Write a PNG or JPEG image
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Write an SVG document
    #[arg(long)]
    svg_out: Option<PathBuf>,

    /// Write a standalone HTML page embedding the symbol
    #[arg(long)]
    html_out: Option<PathBuf>,

    /// Copy the payload to the clipboard
    #[arg(long)]
    copy: bool,

    /// Skip the terminal preview
    #[arg(long)]
    no_preview: bool,
}

#[derive(Subcommand)]
enum Content {
    /// Plain text, encoded unmodified
    Text { text: String },
    /// A URL (https:// is prepended when no scheme is given)
    Url { url: String },
    /// A calendar event (iCalendar VEVENT)
    Event {
        /// Event date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Event time, HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        summary: String,
        #[arg(long)]
        location: String,
    },
    /// A contact card (vCard 3.0)
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
    },
    /// Wi-Fi provisioning credentials
    Wifi {
        #[arg(long)]
        ssid: String,
        /// Required for WPA/WEP, may be omitted for nopass
        #[arg(long, default_value = "")]
        password: String,
        /// WPA, WEP or nopass
        #[arg(long, default_value = "WPA")]
        security: String,
    },
    /// Regenerate a payload stored in history (requires login)
    FromHistory {
        /// History entry id, see `history list`
        id: i64,
    },
}

/// Generate a QR code and write the requested artifacts.
pub fn generate(store: &Store, user: Option<&User>, args: GenerateArgs) -> anyhow::Result<()> {
    print_banner();

    let request = build_request(store, user, &args.content)?;
    let payload = request.format()?;
    let style = resolve_style(store, user, &args)?;

    let code = render::encode(&payload, style.ecc)?;
    let mut img = render::rasterize(&code, &style);
    if let Some(logo) = &args.logo {
        render::embed_logo(&mut img, logo)?;
    }

    if !args.no_preview {
        print_qr_code(&code);
    }

    let estimate = CapacityEstimate::for_payload(&payload);
    println!("\x1b[2m{}\x1b[0m", estimate);

    if let Some(out) = &args.out {
        render::save_image(&img, out)?;
        println!("\x1b[1;32m✓\x1b[0m Image saved to {}", out.display());
    }
    if let Some(out) = &args.svg_out {
        std::fs::write(out, render::to_svg(&code, &style))?;
        println!("\x1b[1;32m✓\x1b[0m SVG saved to {}", out.display());
    }
    if let Some(out) = &args.html_out {
        std::fs::write(out, render::to_html(&img)?)?;
        println!("\x1b[1;32m✓\x1b[0m HTML page saved to {}", out.display());
    }

    if args.copy {
        let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
        clipboard.set_text(payload.clone())?;
        println!("\x1b[1;34m📋\x1b[0m Payload copied to clipboard");
    }

    if let Some(user) = user {
        store.record_history(user.id, request.kind(), &payload)?;
        store.record_analytics(user.id, request.kind())?;
        tracing::debug!("recorded {} generation for {}", request.kind(), user.username);
    }

    Ok(())
}

fn build_request(
    store: &Store,
    user: Option<&User>,
    content: &Content,
) -> anyhow::Result<PayloadRequest> {
    Ok(match content {
        Content::Text { text } => PayloadRequest::PlainText(text.clone()),
        Content::Url { url } => PayloadRequest::Url(url.clone()),
        Content::Event {
            date,
            time,
            summary,
            location,
        } => PayloadRequest::Event {
            date: date.clone(),
            time: time.clone(),
            summary: summary.clone(),
            location: location.clone(),
        },
        Content::Contact { name, phone, email } => PayloadRequest::Contact {
            name: name.clone(),
            phone: phone.clone(),
            email: email.clone(),
        },
        Content::Wifi {
            ssid,
            password,
            security,
        } => PayloadRequest::Wifi {
            ssid: ssid.clone(),
            password: password.clone(),
            security: WifiSecurity::parse(security)?,
        },
        Content::FromHistory { id } => {
            let Some(user) = user else {
                bail!("from-history requires --username and --password");
            };
            let entry = store.history_entry(user.id, *id)?;
            PayloadRequest::parse(entry.kind, &entry.content)?
        }
    })
}

fn resolve_style(
    store: &Store,
    user: Option<&User>,
    args: &GenerateArgs,
) -> anyhow::Result<StyleOptions> {
    let mut base = StyleOptions::default();

    if let Some(name) = &args.template {
        base = style::template(name)?;
    }
    if let Some(name) = &args.favorite {
        let Some(user) = user else {
            bail!("--favorite requires --username and --password");
        };
        base = store.favorite(user.id, name)?;
    }

    args.style.apply(base)
}
