use std::io::Write;

use crossterm::style::{style, Color, Stylize};
use eyre::Result;

use super::conversation_state::{Message, Theme};
use super::persona::EMOJIS;

struct Palette {
    title: Color,
    timestamp: Color,
    user: Color,
    assistant: Color,
}

const LIGHT: Palette = Palette {
    title: Color::Rgb { r: 113, g: 63, b: 18 },
    timestamp: Color::Rgb { r: 133, g: 77, b: 14 },
    user: Color::Rgb { r: 113, g: 63, b: 18 },
    assistant: Color::Rgb { r: 202, g: 138, b: 4 },
};

const DARK: Palette = Palette {
    title: Color::Rgb { r: 254, g: 249, b: 195 },
    timestamp: Color::Rgb { r: 250, g: 204, b: 21 },
    user: Color::Rgb { r: 161, g: 98, b: 7 },
    assistant: Color::Rgb { r: 254, g: 249, b: 195 },
};

fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Light => &LIGHT,
        Theme::Dark => &DARK,
    }
}

pub fn render_header(out: &mut dyn Write, theme: Theme) -> Result<()> {
    writeln!(out, "{}", "AstroJoke".with(palette(theme).title).bold())?;
    Ok(())
}

pub fn render_message(out: &mut dyn Write, message: &Message, theme: Theme) -> Result<()> {
    let palette = palette(theme);
    let (icon, color) = if message.is_user() {
        ("👤", palette.user)
    } else {
        ("🔮", palette.assistant)
    };

    writeln!(
        out,
        "{} {} {}",
        icon,
        message.author().label().bold(),
        message.timestamp().with(palette.timestamp)
    )?;
    for line in message.text().lines() {
        writeln!(out, "   {}", line.with(color))?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

pub fn render_all(out: &mut dyn Write, messages: &[Message], theme: Theme) -> Result<()> {
    for message in messages {
        render_message(out, message, theme)?;
    }
    Ok(())
}

pub fn render_typing(out: &mut dyn Write, theme: Theme) -> Result<()> {
    writeln!(out, "{}", "Guruji is typing...".with(palette(theme).timestamp).italic())?;
    out.flush()?;
    Ok(())
}

pub fn render_emoji_bar(out: &mut dyn Write, theme: Theme) -> Result<()> {
    let bar = EMOJIS
        .iter()
        .enumerate()
        .map(|(i, emoji)| format!("{} {}", style(i + 1).with(palette(theme).timestamp), emoji))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", bar)?;
    writeln!(out, "Use /emoji <number> to add one to your message.")?;
    Ok(())
}

pub fn render_theme_change(out: &mut dyn Write, theme: Theme) -> Result<()> {
    let name = match theme {
        Theme::Light => "Light mode",
        Theme::Dark => "Dark mode",
    };
    writeln!(out, "{}", name.with(palette(theme).title))?;
    render_header(out, theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::chat::conversation_state::Author;

    fn rendered(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buf: Vec<u8> = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn message_shows_author_time_and_every_line() {
        let message = Message::new(Author::Assistant, "line one\nline two");
        let out = rendered(|out| render_message(out, &message, Theme::Dark));

        assert!(out.contains("Guruji"));
        assert!(out.contains(message.timestamp()));
        assert!(out.contains("line one"));
        assert!(out.contains("line two"));
    }

    #[test]
    fn user_message_is_labelled_you() {
        let message = Message::new(Author::User, "hello");
        let out = rendered(|out| render_message(out, &message, Theme::Light));
        assert!(out.contains("You"));
        assert!(!out.contains("Guruji"));
    }

    #[test]
    fn emoji_bar_lists_every_emoji() {
        let out = rendered(|out| render_emoji_bar(out, Theme::Light));
        for emoji in EMOJIS {
            assert!(out.contains(emoji));
        }
    }
}
