use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::editor::{Editor, Mode};

/// Lines moved per PageUp/PageDown in the console
const CONSOLE_PAGE: usize = 10;

pub fn handle_event(editor: &mut Editor, event: Event) {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            // Clear any message on keypress
            editor.clear_message();
            handle_key(editor, key);
        }
        _ => {}
    }
}

fn handle_key(editor: &mut Editor, key: KeyEvent) {
    // Run control works from any mode
    match key.code {
        KeyCode::F(5) => return editor.run_script(),
        KeyCode::F(6) => return editor.stop_run(),
        KeyCode::PageUp => return editor.console.scroll_up(CONSOLE_PAGE),
        KeyCode::PageDown => return editor.console.scroll_down(CONSOLE_PAGE),
        _ => {}
    }

    match editor.mode {
        Mode::Normal => handle_normal_mode(editor, key),
        Mode::Insert => handle_insert_mode(editor, key),
        Mode::Command | Mode::Search => handle_prompt_mode(editor, key),
        Mode::Console => handle_console_mode(editor, key),
    }
}

fn handle_normal_mode(editor: &mut Editor, key: KeyEvent) {
    match key.code {
        // Quick quit with Ctrl-C
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.quit();
        }

        // Basic movement
        KeyCode::Char('h') | KeyCode::Left => editor.move_left(),
        KeyCode::Char('j') | KeyCode::Down => editor.move_down(),
        KeyCode::Char('k') | KeyCode::Up => editor.move_up(),
        KeyCode::Char('l') | KeyCode::Right => editor.move_right(),

        // Line motions
        KeyCode::Char('0') | KeyCode::Home => editor.move_to_line_start(),
        KeyCode::Char('$') | KeyCode::End => editor.move_to_line_end(),
        KeyCode::Char('g') => editor.move_to_first_line(),
        KeyCode::Char('G') => editor.move_to_last_line(),

        // Insert mode entry
        KeyCode::Char('i') => editor.enter_insert_mode(),
        KeyCode::Char('a') => editor.append(),
        KeyCode::Char('A') => editor.append_end_of_line(),
        KeyCode::Char('o') => editor.open_line_below(),
        KeyCode::Char('O') => editor.open_line_above(),

        KeyCode::Char('x') | KeyCode::Delete => editor.delete_char(),

        // Prompts
        KeyCode::Char(':') => editor.enter_command_mode(),
        KeyCode::Char('/') => editor.enter_search_mode(),
        KeyCode::Char('!') => editor.enter_console_mode(),
        KeyCode::Char('n') => editor.find_next(),

        _ => {}
    }
}

fn handle_insert_mode(editor: &mut Editor, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => editor.enter_normal_mode(),

        KeyCode::Char(c) => {
            editor.insert_char(c);
        }

        KeyCode::Tab => editor.insert_tab(),

        KeyCode::Backspace => {
            editor.delete_char_backward();
        }

        KeyCode::Delete => editor.delete_char(),

        KeyCode::Enter => {
            editor.insert_newline();
        }

        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),

        _ => {}
    }
}

/// `:` commands and `/` searches share the status line prompt
fn handle_prompt_mode(editor: &mut Editor, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            editor.command_buffer.clear();
            editor.enter_normal_mode();
        }

        KeyCode::Enter => {
            if editor.mode == Mode::Search {
                let query = std::mem::take(&mut editor.command_buffer);
                editor.enter_normal_mode();
                editor.find(&query);
            } else {
                editor.execute_command();
            }
        }

        KeyCode::Backspace => {
            if editor.command_buffer.pop().is_none() {
                editor.enter_normal_mode();
            }
        }

        KeyCode::Char(c) => {
            editor.command_buffer.push(c);
        }

        _ => {}
    }
}

fn handle_console_mode(editor: &mut Editor, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            editor.console.input.clear();
            editor.enter_normal_mode();
        }

        KeyCode::Enter => {
            let cmd = std::mem::take(&mut editor.console.input);
            editor.run_command(&cmd);
        }

        KeyCode::Backspace => {
            editor.console.input.pop();
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.stop_run();
        }

        KeyCode::Char(c) => {
            editor.console.input.push(c);
        }

        _ => {}
    }
}
