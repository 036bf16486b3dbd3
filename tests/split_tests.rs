//! End-to-end tests: split real MBOX files on disk.

use assert_fs::prelude::*;
use predicates::prelude::*;

use mboxsplit::error::SplitError;
use mboxsplit::split::{split_mbox, FileSink, MemorySink, NullSink, OutputLayout, SplitOptions};

fn message(id: u32, labels: Option<&str>) -> Vec<u8> {
    let mut m = format!(
        "From {id}@xxx Thu Jan 04 10:00:{:02} +0000 2024\r\n\
X-GM-THRID: 17{id}\r\n",
        id % 60
    );
    if let Some(l) = labels {
        m.push_str(&format!("X-Gmail-Labels: {l}\r\n"));
    }
    m.push_str(&format!(
        "From: Sender {id} <s{id}@example.com>\r\n\
Subject: Message {id}\r\n\
\r\n\
Body of message {id}.\r\n\
>From the archive, with bytes \u{e9}\u{e8}.\r\n\
\r\n"
    ));
    m.into_bytes()
}

fn run(dir: &assert_fs::TempDir, input: &str, prefix: &str) -> mboxsplit::split::SplitStats {
    let options = SplitOptions::new(dir.path().join(input), OutputLayout::new(prefix));
    let sink = FileSink::new(dir.path()).protect(&dir.path().join(input)).unwrap();
    split_mbox(&options, sink, None).unwrap().0
}

// ─── Four records, four archives, byte-identical ───────────────────

#[test]
fn test_end_to_end_routing() {
    let dir = assert_fs::TempDir::new().unwrap();
    let inbox = message(1, Some("\\Inbox"));
    let sent = message(2, Some("\\Sent"));
    let project = message(3, Some("Some Project"));
    let unlabeled = message(4, None);
    dir.child("source.mbox")
        .write_binary(
            &[
                inbox.clone(),
                sent.clone(),
                project.clone(),
                unlabeled.clone(),
            ]
            .concat(),
        )
        .unwrap();

    let stats = run(&dir, "source.mbox", "out_");
    assert_eq!(stats.total_records, 4);
    assert_eq!(stats.outputs.len(), 4);

    dir.child("out_Inbox.mbox").assert(predicate::path::exists());
    assert_eq!(std::fs::read(dir.child("out_Inbox.mbox").path()).unwrap(), inbox);
    assert_eq!(std::fs::read(dir.child("out_Sent.mbox").path()).unwrap(), sent);
    assert_eq!(
        std::fs::read(dir.child("out_Some Project.mbox").path()).unwrap(),
        project
    );
    assert_eq!(std::fs::read(dir.child("out_Archive.mbox").path()).unwrap(), unlabeled);

    dir.child("out_Spam.mbox").assert(predicate::path::missing());
    dir.child("out_Trash.mbox").assert(predicate::path::missing());
}

// ─── System labels outrank custom labels ───────────────────────────

#[test]
fn test_precedence_and_custom_labels() {
    let dir = assert_fs::TempDir::new().unwrap();
    let records = [
        message(1, Some("Spam,Inbox")),
        message(2, Some("Work,Trash")),
        message(3, Some("Important,Clients/ACME")),
        message(4, Some("Important,Unread")),
        message(5, Some("Opened,Category Promotions,Inbox")),
        message(6, Some("Important, Clients/ACME")),
    ];
    dir.child("all.mbox").write_binary(&records.concat()).unwrap();

    let stats = run(&dir, "all.mbox", "g_");
    assert_eq!(stats.records_in("g_Spam.mbox"), 1);
    assert_eq!(stats.records_in("g_Trash.mbox"), 1);
    assert_eq!(stats.records_in("g_Clients.ACME.mbox"), 2);
    assert_eq!(stats.records_in("g_Archive.mbox"), 1);
    assert_eq!(stats.records_in("g_Inbox.mbox"), 1);
    assert_eq!(stats.custom_outputs(), 1);

    dir.child("g_Clients.ACME.mbox")
        .assert(predicate::path::is_file());
    assert_eq!(
        std::fs::read(dir.child("g_Clients.ACME.mbox").path()).unwrap(),
        [records[2].clone(), records[5].clone()].concat()
    );
}

// ─── A second run appends instead of overwriting ───────────────────

#[test]
fn test_second_run_appends() {
    let dir = assert_fs::TempDir::new().unwrap();
    let first = [message(1, Some("Inbox")), message(2, Some("Receipts"))].concat();
    let second = [message(3, Some("Inbox")), message(4, Some("Inbox"))].concat();
    dir.child("a.mbox").write_binary(&first).unwrap();
    dir.child("b.mbox").write_binary(&second).unwrap();

    let s1 = run(&dir, "a.mbox", "split_");
    let s2 = run(&dir, "b.mbox", "split_");

    let inbox = std::fs::read(dir.child("split_Inbox.mbox").path()).unwrap();
    assert_eq!(
        inbox,
        [
            message(1, Some("Inbox")),
            message(3, Some("Inbox")),
            message(4, Some("Inbox")),
        ]
        .concat()
    );

    // Re-reading the output finds every message from both runs
    let options = SplitOptions::new(dir.path().join("split_Inbox.mbox"), OutputLayout::new("x_"));
    let (recount, _) = split_mbox(&options, NullSink, None).unwrap();
    assert_eq!(
        recount.total_records,
        s1.records_in("split_Inbox.mbox") + s2.records_in("split_Inbox.mbox")
    );
}

// ─── Missing input leaves the output directory untouched ───────────

#[test]
fn test_missing_input_touches_nothing() {
    let dir = assert_fs::TempDir::new().unwrap();
    let options = SplitOptions::new(dir.path().join("inbox.mbox"), OutputLayout::default());
    let err = split_mbox(&options, FileSink::new(dir.path()), None).unwrap_err();
    assert!(matches!(err, SplitError::FileNotFound(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ─── Input that would also be an output is refused ─────────────────

#[test]
fn test_refuses_to_append_to_input() {
    let dir = assert_fs::TempDir::new().unwrap();
    let original = [message(1, Some("Inbox")), message(2, Some("Inbox"))].concat();
    dir.child("split_Inbox.mbox").write_binary(&original).unwrap();

    let input = dir.path().join("split_Inbox.mbox");
    let options = SplitOptions::new(&input, OutputLayout::default());
    let sink = FileSink::new(dir.path()).protect(&input).unwrap();
    let err = split_mbox(&options, sink, None).unwrap_err();

    assert!(matches!(err, SplitError::OutputIsInput(_)));
    assert_eq!(std::fs::read(&input).unwrap(), original);
}

// ─── In-memory sink yields the filename → bytes mapping ────────────

#[test]
fn test_memory_sink_mapping() {
    let dir = assert_fs::TempDir::new().unwrap();
    let records = [
        message(1, Some("Travel")),
        message(2, None),
        message(3, Some("Travel")),
    ];
    dir.child("in.mbox").write_binary(&records.concat()).unwrap();

    let options = SplitOptions::new(dir.path().join("in.mbox"), OutputLayout::new(""));
    let (stats, sink) = split_mbox(&options, MemorySink::new(), None).unwrap();
    let outputs = sink.into_outputs();

    assert_eq!(stats.total_records, 3);
    assert_eq!(
        outputs.keys().collect::<Vec<_>>(),
        vec!["Archive.mbox", "Travel.mbox"]
    );
    assert_eq!(outputs["Travel.mbox"], [records[0].clone(), records[2].clone()].concat());
    assert_eq!(outputs["Archive.mbox"], records[1]);
    // Nothing besides the input was created
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

// ─── Dry run counts without writing ────────────────────────────────

#[test]
fn test_dry_run_writes_nothing() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("in.mbox")
        .write_binary(&[message(1, Some("Sent")), message(2, Some("Spam"))].concat())
        .unwrap();

    let options = SplitOptions::new(dir.path().join("in.mbox"), OutputLayout::default());
    let (stats, _) = split_mbox(&options, NullSink, None).unwrap();

    assert_eq!(stats.total_records, 2);
    assert_eq!(stats.records_in("split_Sent.mbox"), 1);
    dir.child("split_Sent.mbox").assert(predicate::path::missing());
}

// ─── Reserved and hostile label names ──────────────────────────────

#[test]
fn test_reserved_and_illegal_labels() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("in.mbox")
        .write_binary(
            &[
                message(1, Some("CON")),
                message(2, Some("../../etc/passwd")),
                message(3, Some("=?UTF-8?Q?Facturaci=C3=B3n?=")),
            ]
            .concat(),
        )
        .unwrap();

    let stats = run(&dir, "in.mbox", "p_");
    dir.child("p__CON.mbox").assert(predicate::path::is_file());
    dir.child("p_etc.passwd.mbox").assert(predicate::path::is_file());
    dir.child("p_Facturaci\u{f3}n.mbox")
        .assert(predicate::path::is_file());
    assert_eq!(stats.outputs.len(), 3);
}
