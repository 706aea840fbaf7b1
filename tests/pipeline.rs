use pstree::source::StaticSource;
use pstree::{ParsePolicy, ProcessRecord, Render, RenderOptions, SnapshotBuilder};

fn render(lines: &[&str], root: Option<usize>, options: RenderOptions) -> Vec<String> {
    let snapshot = SnapshotBuilder::new(ParsePolicy::Abort)
        .build(&StaticSource::new(lines.iter().copied()))
        .unwrap();
    let tree = snapshot.resolve();
    let render = match root {
        Some(root) => Render::new(&tree, root, options),
        None => Render::forest(&tree, options),
    };
    render.map(|line| line.unwrap().to_string()).collect()
}

#[test]
fn test_parse_bash_record() {
    let record: ProcessRecord = "12 (bash) S 1 12 12 0 -1 4194560".parse().unwrap();
    assert_eq!(record.id, 12);
    assert_eq!(record.name, "bash");
    assert_eq!(record.parent_id, 1);
}

#[test]
fn test_parse_name_with_parenthesis() {
    let record: ProcessRecord = "7 (my proc (x)) S 0 7 7 0".parse().unwrap();
    assert_eq!(record.name, "my proc (x)");
    assert_eq!(record.parent_id, 0);
}

#[test]
fn test_sorted_children_with_pids() {
    let lines = render(
        &["1 (init) S 0", "5 (five) S 1", "3 (three) S 1"],
        Some(0),
        RenderOptions {
            show_pids: true,
            numeric_sort: true,
        },
    );
    assert_eq!(lines, vec!["init(1)", "\tthree(3)", "\tfive(5)"]);
}

#[test]
fn test_orphan_is_an_additional_root() {
    let lines = render(
        &["1 (init) S 0", "2 (sh) S 1", "300 (lost) S 299"],
        None,
        RenderOptions::default(),
    );
    assert_eq!(lines, vec!["init", "\tsh", "lost"]);

    let lines = render(
        &["1 (init) S 0", "2 (sh) S 1", "300 (lost) S 299"],
        Some(0),
        RenderOptions::default(),
    );
    assert_eq!(lines, vec!["init", "\tsh"]);
}

#[cfg(target_os = "linux")]
mod proc_root {
    use pstree::source::ProcfsSource;
    use pstree::{ParsePolicy, Render, RenderOptions, SnapshotBuilder};
    use tempfile::TempDir;

    #[test_log::test]
    fn test_fake_proc_root() {
        let root = TempDir::new().unwrap();
        for (pid, stat) in [
            ("1", "1 (init) S 0 1 1 0 -1\n"),
            ("20", "20 (sshd) S 1 20 20 0 -1\n"),
            ("21", "21 (sshd: bob [priv]) S 20 21 21 0 -1\n"),
            ("5", "5 (kthreadd) S 0 0 0 0 -1\n"),
        ] {
            let dir = root.path().join(pid);
            std::fs::create_dir(&dir).unwrap();
            std::fs::write(dir.join("stat"), stat).unwrap();
        }
        std::fs::write(root.path().join("loadavg"), "0.00 0.01 0.05 1/100 42\n").unwrap();

        let tree = SnapshotBuilder::new(ParsePolicy::Abort)
            .build(&ProcfsSource::new(root.path()))
            .unwrap()
            .resolve();
        let options = RenderOptions {
            show_pids: true,
            numeric_sort: true,
        };
        let lines: Vec<_> = Render::forest(&tree, options)
            .map(|line| line.unwrap().to_string())
            .collect();

        assert_eq!(
            lines,
            vec!["init(1)", "\tsshd(20)", "\t\tsshd: bob [priv](21)", "kthreadd(5)"]
        );
    }

    #[test_log::test]
    fn test_live_proc_contains_this_process() {
        let tree = SnapshotBuilder::new(ParsePolicy::Abort)
            .build(&ProcfsSource::default())
            .unwrap()
            .resolve();

        let own_pid = std::process::id();
        let index = tree
            .position_of(own_pid)
            .expect("the test process should be listed");
        assert_eq!(tree.records()[index].id, own_pid);

        for (index, record) in tree.records().iter().enumerate() {
            assert_ne!(record.parent_index, Some(index));
        }

        let rendered = Render::forest(&tree, RenderOptions::default())
            .filter(|line| line.is_ok())
            .count();
        assert_eq!(rendered + tree.detached().len(), tree.len());
        assert!(Render::new(&tree, index, RenderOptions::default()).count() >= 1);
    }
}
