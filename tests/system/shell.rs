use embkit::system::rbuffer::RingBuffer;
use embkit::system::shell::*;
use rand::Rng;
use std::cell::RefCell;

thread_local! {
    /// Per-thread terminal capture, so parallel tests never see each other's bytes
    static TERMINAL: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };

    /// Arguments seen by the recording handler
    static CALLS: RefCell<Vec<Vec<String>>> = const { RefCell::new(Vec::new()) };
}

fn terminal_output_fn(byte: u8) {
    TERMINAL.with(|t| t.borrow_mut().push(byte));
}

fn get_test_output() -> String {
    TERMINAL.with(|t| String::from_utf8_lossy(&std::mem::take(&mut *t.borrow_mut())).into_owned())
}

fn clear_test_output() {
    TERMINAL.with(|t| t.borrow_mut().clear());
}

fn take_calls() -> Vec<Vec<String>> {
    CALLS.with(|c| std::mem::take(&mut *c.borrow_mut()))
}

/// Test command handler that records its arguments
fn record_handler(ctx: &mut Context<'_>, argc: usize, argv: &[&str]) -> ShellResult {
    assert_eq!(argc, argv.len());
    CALLS.with(|c| c.borrow_mut().push(argv.iter().map(|s| s.to_string()).collect()));
    ctx.put_str("recorded\r\n");
    ShellResult::Ok
}

fn fail_handler(_ctx: &mut Context<'_>, _argc: usize, _argv: &[&str]) -> ShellResult {
    ShellResult::InvalidParameter
}

static HELP_ONLY: [CommandEntry; 2] = [
    CommandEntry::Command(Command {
        name: "help",
        usage: "help -- recorded",
        handler: record_handler,
    }),
    CommandEntry::Alias { name: "?", target: 0 },
];

static DEVICE_COMMANDS: [CommandEntry; 3] = [
    CommandEntry::Command(Command {
        name: "led",
        usage: "led <on|off> -- switch the led",
        handler: record_handler,
    }),
    CommandEntry::Alias { name: "l", target: 0 },
    CommandEntry::Command(Command {
        name: "fail",
        usage: "fail -- always fails",
        handler: fail_handler,
    }),
];

/// A shell wired to the capture sink with an empty terminal
fn session(registry: Registry) -> Shell {
    let mut shell = Shell::new(registry);
    assert_eq!(shell.set_output_function(terminal_output_fn), ShellResult::Ok);
    clear_test_output();
    take_calls();
    shell
}

const LEFT: &[u8] = b"\x1b[D";
const RIGHT: &[u8] = b"\x1b[C";
#[cfg(feature = "history")]
const UP: &[u8] = b"\x1b[A";
#[cfg(feature = "history")]
const DOWN: &[u8] = b"\x1b[B";

fn random_line(rng: &mut impl Rng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(b' '..=b'~')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_default_has_builtins() {
        let shell = Shell::default();
        assert!(shell.registry().find("help").is_some());
        assert!(shell.registry().find("?").is_some());
        assert!(shell.registry().find("test").is_some());
        assert_eq!(shell.prompt(), DEFAULT_PROMPT);
        assert_eq!(shell.count(), 0);
    }

    #[test]
    fn test_start_emits_prompt() {
        let shell = session(Registry::builtins());
        shell.start();
        assert_eq!(get_test_output(), "\r\n[CLI] > ");
    }

    #[test]
    fn test_input_printable_characters() {
        let mut shell = session(Registry::builtins());

        let result = shell.input(b"hello");
        assert_eq!(result, ShellResult::Ok);

        // Should echo the characters
        assert_eq!(get_test_output(), "hello");
        assert_eq!(shell.line(), "hello");
    }

    #[test]
    fn test_insert_count_matches_input() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let mut shell = session(Registry::empty());
            let n = rng.gen_range(0..LINE_CAPACITY);
            let typed = random_line(&mut rng, n);

            assert_eq!(shell.input(&typed), ShellResult::Ok);
            assert_eq!(shell.count(), n);
            assert_eq!(shell.line().as_bytes(), &typed[..]);
        }
    }

    #[test]
    fn test_insert_then_backspace_is_identity() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let mut shell = session(Registry::empty());
            let len = rng.gen_range(1..MAX_LINE_LEN);
            shell.input(&random_line(&mut rng, len));
            for _ in 0..rng.gen_range(0..len) {
                shell.input(LEFT);
            }

            let before = (shell.line().to_string(), shell.count(), shell.cursor());
            let ch = rng.gen_range(b' '..=b'~');
            shell.feed_byte(ch);
            assert_eq!(shell.count(), before.1 + 1);
            shell.feed_byte(0x7F);

            assert_eq!((shell.line().to_string(), shell.count(), shell.cursor()), before);
        }
    }

    #[test]
    fn test_left_right_round_trip() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let mut shell = session(Registry::empty());
            let len = rng.gen_range(0..MAX_LINE_LEN);
            shell.input(&random_line(&mut rng, len));
            for _ in 0..rng.gen_range(0..=len) {
                shell.input(LEFT);
            }

            let start = shell.cursor();
            let steps = rng.gen_range(0..=start);
            for _ in 0..steps {
                shell.input(LEFT);
            }
            for _ in 0..steps {
                shell.input(RIGHT);
            }
            assert_eq!(shell.cursor(), start);

            // right first, bounded by the line end
            let steps = rng.gen_range(0..=len - start);
            for _ in 0..steps {
                shell.input(RIGHT);
            }
            for _ in 0..steps {
                shell.input(LEFT);
            }
            assert_eq!(shell.cursor(), start);
        }
    }

    #[test]
    fn test_cursor_clamped_to_line() {
        let mut shell = session(Registry::empty());
        shell.input(b"ab");
        for _ in 0..5 {
            shell.input(LEFT);
        }
        assert_eq!(shell.cursor(), 0);
        for _ in 0..5 {
            shell.input(RIGHT);
        }
        assert_eq!(shell.cursor(), 2);
    }

    #[test]
    fn test_mid_line_edit_display() {
        let mut shell = session(Registry::empty());
        shell.input(b"tst");
        shell.input(LEFT);
        shell.input(LEFT);
        clear_test_output();

        shell.input(b"e");
        assert_eq!(shell.line(), "test");
        assert_eq!(get_test_output(), "est\x08\x08");

        shell.input(b"\x08");
        assert_eq!(shell.line(), "tst");
        assert_eq!(get_test_output(), "\x08st \x08\x08\x08");
    }

    #[test]
    fn test_line_full_drops_input() {
        let mut shell = session(Registry::empty());
        let long = [b'a'; LINE_CAPACITY + 10];

        assert_eq!(shell.input(&long), ShellResult::BufferOverflow);
        assert_eq!(shell.count(), MAX_LINE_LEN);

        // editing keys still work on a full line
        assert_eq!(shell.feed_byte(0x08), ShellResult::Ok);
        assert_eq!(shell.count(), MAX_LINE_LEN - 1);
    }

    #[test]
    fn test_noise_and_unknown_controls_ignored() {
        let mut shell = session(Registry::empty());
        shell.input(b"a\x00\xff\x01\x07b");
        assert_eq!(shell.line(), "ab");
        assert_eq!(get_test_output(), "ab");
    }

    #[test]
    fn test_broken_escape_swallows_byte() {
        let mut shell = session(Registry::empty());
        shell.input(b"\x1bxy");
        assert_eq!(shell.line(), "y");

        shell.input(b"\x1b[Zq");
        assert_eq!(shell.line(), "yq");
        assert_eq!(shell.decoder_state(), DecoderState::Normal);
    }

    #[test]
    fn test_escape_sequence_split_across_chunks() {
        let mut shell = session(Registry::empty());
        shell.input(b"abc\x1b");
        assert_eq!(shell.decoder_state(), DecoderState::SawEscape);
        shell.input(b"[");
        assert_eq!(shell.decoder_state(), DecoderState::SawBracket);
        shell.input(b"D");
        assert_eq!(shell.cursor(), 2);
    }

    #[test]
    fn test_dispatch_help_and_alias() {
        let mut shell = session(Registry::new(&HELP_ONLY).unwrap());

        shell.input(b"help\r");
        shell.input(b"?\r");

        let calls = take_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ["help"]);
        // the handler sees the name that was typed
        assert_eq!(calls[1], ["?"]);
    }

    #[test]
    fn test_dispatch_splits_arguments() {
        let mut shell = session(Registry::new(&DEVICE_COMMANDS).unwrap());

        shell.input(b"   led   on  now \r");
        assert_eq!(take_calls(), [["led", "on", "now"]]);

        shell.input(b"l off\n");
        assert_eq!(take_calls(), [["l", "off"]]);
    }

    #[test]
    fn test_dispatch_output_framing() {
        let mut shell = session(Registry::new(&DEVICE_COMMANDS).unwrap());

        shell.input(b"led\r");
        assert_eq!(get_test_output(), "led\r\nrecorded\r\n[CLI] > ");
    }

    #[test]
    fn test_unknown_command() {
        let mut shell = session(Registry::builtins());

        shell.input(b"frobnicate\r");
        let output = get_test_output();
        assert!(output.contains("Not found command \"frobnicate\""));
        assert!(output.ends_with("\r\n[CLI] > "));
        assert_eq!(shell.count(), 0);
        assert_eq!(shell.cursor(), 0);

        // ready for the next line
        shell.input(b"test\r");
        assert!(get_test_output().contains("arg[0] = test\r\n"));
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        let mut shell = session(Registry::new(&DEVICE_COMMANDS).unwrap());
        shell.input(b"le\r");
        assert!(get_test_output().contains("Not found command \"le\""));
        assert!(take_calls().is_empty());
    }

    #[test]
    fn test_failing_handler_keeps_session() {
        let mut shell = session(Registry::new(&DEVICE_COMMANDS).unwrap());
        shell.input(b"fail\r");
        assert_eq!(get_test_output(), "fail\r\n[CLI] > ");
        assert_eq!(shell.count(), 0);
    }

    #[test]
    fn test_empty_and_blank_lines() {
        let mut shell = session(Registry::builtins());

        shell.input(b"\r");
        assert_eq!(get_test_output(), "\r\n[CLI] > ");

        shell.input(b"   \r");
        assert_eq!(get_test_output(), "   \r\n[CLI] > ");
    }

    #[test]
    fn test_too_many_args_not_dispatched() {
        let mut shell = session(Registry::new(&DEVICE_COMMANDS).unwrap());

        shell.input(b"led 1 2 3 4 5 6\r");
        assert!(take_calls().is_empty());
        assert!(get_test_output().contains("Too many args (max 5):\r\n  < led 1 2 3 4 >\r\n"));

        // exactly MAX_ARGS tokens still run
        shell.input(b"led 1 2 3 4\r");
        assert_eq!(take_calls().len(), 1);
    }

    #[test]
    fn test_empty_registry_never_matches() {
        let mut shell = session(Registry::empty());
        shell.input(b"help\r");
        assert!(get_test_output().contains("Not found command \"help\""));

        shell.input(b"he\t");
        assert_eq!(shell.line(), "he");
    }

    #[test]
    fn test_custom_prompt() {
        let mut shell = session(Registry::builtins());
        shell.set_prompt(Some("dev> "));

        shell.input(b"\r");
        assert_eq!(get_test_output(), "\r\ndev> ");

        shell.set_prompt(None);
        shell.start();
        assert_eq!(get_test_output(), "\r\n[CLI] > ");
    }

    #[test]
    fn test_tab_completes_unique_name() {
        let mut shell = session(Registry::builtins());

        shell.input(b"hel\t");
        assert_eq!(shell.line(), "help");
        assert_eq!(shell.count(), 4);
        assert_eq!(shell.cursor(), 4);
        assert_eq!(get_test_output(), "hel\x08 \x08\x08 \x08\x08 \x08help");
    }

    #[test]
    fn test_tab_strips_leading_spaces() {
        let mut shell = session(Registry::builtins());
        shell.input(b"  te\t");
        assert_eq!(shell.line(), "test");
    }

    #[test]
    fn test_tab_from_mid_line() {
        let mut shell = session(Registry::builtins());
        shell.input(b"tes");
        shell.input(LEFT);
        clear_test_output();

        shell.input(b"\t");
        assert_eq!(shell.line(), "test");
        assert_eq!(shell.cursor(), 4);
        assert_eq!(get_test_output(), " \x08 \x08\x08 \x08\x08 \x08test");
    }

    #[test]
    fn test_tab_no_match_or_blank() {
        let mut shell = session(Registry::builtins());
        shell.input(b"zz\t");
        assert_eq!(shell.line(), "zz");
        assert_eq!(get_test_output(), "zz");

        let mut shell = session(Registry::builtins());
        shell.input(b"   \t");
        assert_eq!(shell.line(), "   ");
        assert_eq!(get_test_output(), "   ");
    }

    #[test]
    fn test_tab_completes_user_command() {
        let mut shell = session(Registry::with_builtins(&DEVICE_COMMANDS).unwrap());
        shell.input(b"f\t");
        assert_eq!(shell.line(), "fail");
    }

    #[test]
    fn test_tab_completes_alias_name() {
        static RENAMED: [CommandEntry; 2] = [
            CommandEntry::Command(Command {
                name: "status",
                usage: "status -- print device state",
                handler: record_handler,
            }),
            CommandEntry::Alias {
                name: "info",
                target: 0,
            },
        ];
        let mut shell = session(Registry::new(&RENAMED).unwrap());

        shell.input(b"i\t");
        assert_eq!(shell.line(), "info");
        assert_eq!(shell.count(), 4);

        shell.input(b" now\r");
        assert_eq!(take_calls(), [["info", "now"]]);
    }

    #[cfg(feature = "history")]
    #[test]
    fn test_tab_lists_multiple_matches() {
        let mut shell = session(Registry::builtins());

        shell.input(b"h\t");
        assert_eq!(shell.line(), "h");
        assert_eq!(shell.count(), 1);
        assert_eq!(get_test_output(), "h\r\nhelp\r\nhistory\r\n[CLI] > h");

        shell.input(b"e\t");
        assert_eq!(shell.line(), "help");
        assert_eq!(shell.count(), 4);
    }

    #[test]
    fn test_tab_lists_in_registry_order() {
        static SIMILAR: [CommandEntry; 3] = [
            CommandEntry::Command(Command {
                name: "set-b",
                usage: "",
                handler: record_handler,
            }),
            CommandEntry::Command(Command {
                name: "set-a",
                usage: "",
                handler: record_handler,
            }),
            CommandEntry::Command(Command {
                name: "set-c",
                usage: "",
                handler: record_handler,
            }),
        ];
        let mut shell = session(Registry::new(&SIMILAR).unwrap());

        shell.input(b"set\t");
        assert_eq!(
            get_test_output(),
            "set\r\nset-b\r\nset-a\r\nset-c\r\n[CLI] > set"
        );
    }

    #[test]
    fn test_drain_ring_buffer() {
        let mut shell = session(Registry::new(&DEVICE_COMMANDS).unwrap());
        let mut rx: RingBuffer<16> = RingBuffer::new();

        rx.write(b"led on\r");
        assert_eq!(shell.drain(&mut rx), ShellResult::Ok);
        assert!(rx.is_empty());
        assert_eq!(take_calls(), [["led", "on"]]);
    }

    #[test]
    fn test_clear_and_prompt_repaints() {
        let mut shell = session(Registry::builtins());
        shell.input(b"abc");
        shell.input(LEFT);
        clear_test_output();

        shell.clear_and_prompt();
        let output = get_test_output();
        let repaint = "[CLI] > abc\x08";
        assert!(output.ends_with(repaint));
        let erased = &output[..output.len() - repaint.len()];
        assert_eq!(erased, "\x08 \x08".repeat(2 + DEFAULT_PROMPT.len()));
        assert_eq!(shell.cursor(), 2);
    }

    #[test]
    fn test_builtin_help_lists_all() {
        let mut shell = session(Registry::with_builtins(&DEVICE_COMMANDS).unwrap());

        shell.input(b"help\r");
        let output = get_test_output();
        assert!(output.contains("System all command:\r\n"));
        assert!(output.contains("    help\r\n"));
        assert!(output.contains("    ? -> help\r\n"));
        assert!(output.contains("    l -> led\r\n"));
        assert!(output.contains("    test\r\n"));

        let help = output.find("    help\r\n").unwrap();
        let led = output.find("    led\r\n").unwrap();
        assert!(help < led);
    }

    #[test]
    fn test_builtin_help_for_command() {
        let mut shell = session(Registry::with_builtins(&DEVICE_COMMANDS).unwrap());

        shell.input(b"help led\r");
        assert!(get_test_output().contains("command:led\r\n  usage:led <on|off> -- switch the led\r\n"));

        shell.input(b"? l\r");
        assert!(get_test_output().contains("command:l -> led\r\n  usage:led <on|off> -- switch the led\r\n"));

        shell.input(b"help nope\r");
        assert!(get_test_output().contains("Not found command \"nope\"\r\n"));

        shell.input(b"help a b\r");
        assert!(get_test_output().contains("Too many args!"));
    }

    #[test]
    fn test_builtin_test_echoes_args() {
        let mut shell = session(Registry::builtins());

        shell.input(b"test one two\r");
        assert_eq!(
            get_test_output(),
            "test one two\r\narg[0] = test\r\narg[1] = one\r\narg[2] = two\r\n[CLI] > "
        );
    }

    #[cfg(feature = "history")]
    #[test]
    fn test_builtin_history() {
        let mut shell = session(Registry::builtins());
        shell.input(b"test a\r");
        shell.input(b"test b\r");
        clear_test_output();

        shell.input(b"history\r");
        assert_eq!(
            get_test_output(),
            "history\r\n    history\r\n    test b\r\n    test a\r\n[CLI] > "
        );

        shell.input(b"history 2\r");
        assert_eq!(
            get_test_output(),
            "history 2\r\n    history 2\r\n    history\r\n[CLI] > "
        );

        shell.input(b"history x\r");
        assert_eq!(get_test_output(), "history x\r\n[CLI] > ");

        shell.input(b"history -3\r");
        assert_eq!(
            get_test_output(),
            "history -3\r\n    history -3\r\n    history x\r\n    history 2\r\n    \
             history\r\n    test b\r\n    test a\r\n[CLI] > "
        );
    }

    #[cfg(feature = "history")]
    #[test]
    fn test_history_keeps_newest_entries() {
        let mut shell = session(Registry::empty());
        let k = 3;
        for i in 0..HISTORY_DEPTH + k {
            shell.input(format!("cmd{}\r", i).as_bytes());
        }
        assert_eq!(shell.history().len(), HISTORY_DEPTH);

        shell.input(b"draft");
        let mut seen = Vec::new();
        for _ in 0..HISTORY_DEPTH + 2 {
            shell.input(UP);
            seen.push(shell.line().to_string());
        }

        let expected: Vec<String> = (k..HISTORY_DEPTH + k).rev().map(|i| format!("cmd{}", i)).collect();
        assert_eq!(&seen[..HISTORY_DEPTH], &expected[..]);
        // Up at the oldest entry changes nothing
        assert_eq!(seen[HISTORY_DEPTH], format!("cmd{}", k));
        assert_eq!(seen[HISTORY_DEPTH + 1], format!("cmd{}", k));
        assert!(!seen.iter().any(|line| line == "cmd0"));
    }

    #[cfg(feature = "history")]
    #[test]
    fn test_history_up_down_restores_draft() {
        let mut rng = rand::thread_rng();
        let mut shell = session(Registry::empty());
        let total = rng.gen_range(1..=HISTORY_DEPTH);
        for i in 0..total {
            shell.input(format!("line{}\r", i).as_bytes());
        }

        shell.input(b"half typed");
        shell.input(LEFT);
        for _ in 0..total {
            shell.input(UP);
        }
        assert_eq!(shell.line(), "line0");
        assert_eq!(shell.history().inquire_count(), total);

        for _ in 0..total {
            shell.input(DOWN);
        }
        assert_eq!(shell.line(), "half typed");
        assert_eq!(shell.cursor(), shell.count());
        assert!(!shell.history().is_scrolling());

        // Down while not scrolling is a no-op
        clear_test_output();
        shell.input(DOWN);
        assert_eq!(shell.line(), "half typed");
        assert_eq!(get_test_output(), "");
    }

    #[cfg(feature = "history")]
    #[test]
    fn test_history_display_redraw() {
        let mut shell = session(Registry::empty());
        shell.input(b"ab\r");
        shell.input(b"xyz");
        shell.input(LEFT);
        clear_test_output();

        shell.input(UP);
        assert_eq!(shell.line(), "ab");
        assert_eq!(get_test_output(), " \x08 \x08\x08 \x08\x08 \x08ab");
    }

    #[cfg(feature = "history")]
    #[test]
    fn test_history_recall_then_submit() {
        let mut shell = session(Registry::new(&DEVICE_COMMANDS).unwrap());
        shell.input(b"led on\r");
        take_calls();

        shell.input(UP);
        shell.input(b"\r");
        assert_eq!(take_calls(), [["led", "on"]]);
        assert_eq!(shell.history().len(), 2);
        assert!(!shell.history().is_scrolling());
    }

    #[cfg(feature = "history")]
    #[test]
    fn test_empty_enter_after_recall_ends_browsing() {
        let mut shell = session(Registry::empty());
        shell.input(b"old\r");
        shell.input(b"draft");

        shell.input(UP);
        assert_eq!(shell.line(), "old");
        shell.input(&[0x7F; 3]);
        shell.input(b"\r");
        assert_eq!(shell.count(), 0);
        assert_eq!(shell.history().len(), 1);
        assert_eq!(shell.history().inquire_count(), 0);

        shell.input(b"fresh");
        shell.input(UP);
        assert_eq!(shell.line(), "old");
        shell.input(DOWN);
        assert_eq!(shell.line(), "fresh");
        assert!(!shell.history().is_scrolling());
    }

    #[cfg(feature = "history")]
    #[test]
    fn test_up_with_empty_history_is_noop() {
        let mut shell = session(Registry::builtins());
        shell.input(b"abc");
        clear_test_output();

        shell.input(UP);
        assert_eq!(shell.line(), "abc");
        assert_eq!(get_test_output(), "");
    }

    #[cfg(not(feature = "history"))]
    #[test]
    fn test_arrow_up_without_history_is_noop() {
        let mut shell = session(Registry::builtins());
        shell.input(b"help\r");
        clear_test_output();

        assert_eq!(shell.input(b"\x1b[A"), ShellResult::Ok);
        assert_eq!(shell.input(b"\x1b[B"), ShellResult::Ok);
        assert_eq!(shell.count(), 0);
        assert_eq!(shell.decoder_state(), DecoderState::Normal);
        assert_eq!(get_test_output(), "");
    }

    #[test]
    fn test_independent_sessions() {
        let mut first = session(Registry::builtins());
        let mut second = Shell::default();

        first.input(b"abc");
        second.input(b"xy");
        assert_eq!(first.line(), "abc");
        assert_eq!(second.line(), "xy");
    }
}
