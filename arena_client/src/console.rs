//! Console commands.
//!
//! A terminal stands in for the browser's keyboard and mouse. Lines typed on
//! stdin are parsed into `ConsoleCommand`s:
//!
//! ```text
//! +forward / -forward     (also left, back, right, or w/a/s/d)
//! +attack  / -attack      mouse button down / up
//! aim <x> <y>             mouse moved to screen position
//! size <w> <h>            viewport resized
//! status                  print client state
//! quit                    exit
//! ```

use anyhow::{bail, Context};

use crate::input::{InputEvent, Key};

/// A parsed console line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Input(InputEvent),
    Resize { width: f32, height: f32 },
    Status,
    Quit,
}

fn parse_key(name: &str) -> Option<Key> {
    match name {
        "forward" => Some(Key::Forward),
        "left" => Some(Key::Left),
        "back" => Some(Key::Back),
        "right" => Some(Key::Right),
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::from_char(c),
                _ => None,
            }
        }
    }
}

fn parse_pair(tokens: &[&str], usage: &str) -> anyhow::Result<(f32, f32)> {
    if tokens.len() != 3 {
        bail!("Usage: {usage}");
    }
    let a = tokens[1].parse().with_context(|| format!("bad number '{}'", tokens[1]))?;
    let b = tokens[2].parse().with_context(|| format!("bad number '{}'", tokens[2]))?;
    Ok((a, b))
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ConsoleCommand>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(None);
    };

    let cmd = match head {
        "status" => ConsoleCommand::Status,
        "quit" | "exit" => ConsoleCommand::Quit,
        "aim" => {
            let (x, y) = parse_pair(&tokens, "aim <x> <y>")?;
            ConsoleCommand::Input(InputEvent::MouseMoved { x, y })
        }
        "size" => {
            let (width, height) = parse_pair(&tokens, "size <width> <height>")?;
            ConsoleCommand::Resize { width, height }
        }
        _ => {
            let (pressed, name) = if let Some(rest) = head.strip_prefix('+') {
                (true, rest)
            } else if let Some(rest) = head.strip_prefix('-') {
                (false, rest)
            } else {
                bail!("Unknown command '{head}'");
            };
            if name == "attack" {
                ConsoleCommand::Input(InputEvent::MouseButton { pressed })
            } else {
                let key = parse_key(name).with_context(|| format!("Unknown key '{name}'"))?;
                ConsoleCommand::Input(InputEvent::KeyChanged { key, pressed })
            }
        }
    };
    Ok(Some(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_movement_toggles() {
        assert_eq!(
            parse_line("+forward").unwrap(),
            Some(ConsoleCommand::Input(InputEvent::KeyChanged {
                key: Key::Forward,
                pressed: true
            }))
        );
        assert_eq!(
            parse_line("  -d ").unwrap(),
            Some(ConsoleCommand::Input(InputEvent::KeyChanged {
                key: Key::Right,
                pressed: false
            }))
        );
    }

    #[test]
    fn parses_attack_and_aim() {
        assert_eq!(
            parse_line("+attack").unwrap(),
            Some(ConsoleCommand::Input(InputEvent::MouseButton { pressed: true }))
        );
        assert_eq!(
            parse_line("aim 120 -4.5").unwrap(),
            Some(ConsoleCommand::Input(InputEvent::MouseMoved { x: 120.0, y: -4.5 }))
        );
    }

    #[test]
    fn parses_plain_commands() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("status").unwrap(), Some(ConsoleCommand::Status));
        assert_eq!(parse_line("exit").unwrap(), Some(ConsoleCommand::Quit));
        assert_eq!(
            parse_line("size 1024 768").unwrap(),
            Some(ConsoleCommand::Resize {
                width: 1024.0,
                height: 768.0
            })
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_line("aim 1").is_err());
        assert!(parse_line("aim x y").is_err());
        assert!(parse_line("+jump").is_err());
        assert!(parse_line("dance").is_err());
    }
}
