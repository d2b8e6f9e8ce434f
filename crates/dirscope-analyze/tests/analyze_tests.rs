use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, SystemTime};

use dirscope_analyze::{
    CleanupConfig, CleanupSuggestions, Filter, Query, SortDirection, SortField, SortSpec,
    cleanup_suggestions, compute_stats, entries, export_entries, find_duplicates, flatten,
    ExportError, ExportFormat,
};
use dirscope_core::classify::{GIB, MIB};
use dirscope_core::{Entry, MemoryFs, ScanResult};
use dirscope_scan::{CancellationToken, Scanner};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

async fn scan(fs: &MemoryFs) -> ScanResult {
    Scanner::new()
        .scan(fs.root(), &CancellationToken::new())
        .await
        .unwrap()
}

fn sample_fs(now: SystemTime) -> MemoryFs {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 100)
        .add_file("root/sub/b.txt", 200)
        .add_file("root/sub/Report.PDF", 4 * MIB)
        .add_file("root/docs/report.pdf", 4 * MIB)
        .add_file("root/docs/notes.md", 3 * MIB)
        .add_file_modified("root/old/archive.iso", 2 * GIB, now - 800 * DAY)
        .add_file_modified("root/old/tiny.txt", 10, now - 800 * DAY)
        .add_file("root/movies/film.mkv", 150 * MIB)
        .add_file("root/build.log", 5 * MIB)
        .add_dir("root/empty");
    fs
}

fn paths<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Vec<String> {
    entries.into_iter().map(|e| e.path.clone()).collect()
}

fn cleanup_snapshot(s: &CleanupSuggestions<'_>) -> Vec<Vec<String>> {
    vec![
        paths(s.temp_files.iter().copied()),
        paths(s.large_files.iter().copied()),
        paths(s.old_files.iter().copied()),
        paths(s.duplicates.files()),
        paths(s.empty_folders.iter().copied()),
    ]
}

#[tokio::test]
async fn test_scenario_root_with_subfolder() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 100).add_file("root/sub/b.txt", 200);
    let result = scan(&fs).await;

    assert_eq!(result.root.size, 300);
    assert_eq!(result.root.find("root/sub").unwrap().size, 200);
    assert_eq!(flatten(&result.root).len(), 2);
}

#[tokio::test]
async fn test_tree_invariants() {
    let now = SystemTime::now();
    let result = scan(&sample_fs(now)).await;

    for dir in result.root.iter().filter(|e| e.is_dir()) {
        let sum: u64 = dir.children.iter().map(|c| c.size).sum();
        assert_eq!(dir.size, sum, "size mismatch at {}", dir.path);
        for child in &dir.children {
            assert_eq!(child.path, format!("{}/{}", dir.path, child.name));
        }
    }

    let files = flatten(&result.root);
    assert_eq!(files.len(), result.root.count_files());
    let unique: BTreeSet<&str> = result.root.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(unique.len(), result.root.iter().count());
}

#[tokio::test]
async fn test_stats_over_scan() {
    let now = SystemTime::now();
    let result = scan(&sample_fs(now)).await;
    let stats = compute_stats(&result.root);

    assert_eq!(stats.total_files, 9);
    // root, sub, docs, old, movies, empty
    assert_eq!(stats.total_folders, 6);
    assert_eq!(stats.total_size, result.total_size());
    assert_eq!(stats.largest_file.as_ref().unwrap().path, "root/old/archive.iso");
    assert_eq!(stats.largest_folder.as_ref().unwrap().path, "root/old");
    assert_eq!(stats.size_distribution.huge, 1);
    assert_eq!(stats.permissions.readable, 15);
}

#[tokio::test]
async fn test_aggregation_is_idempotent() {
    let now = SystemTime::now();
    let result = scan(&sample_fs(now)).await;
    let config = CleanupConfig::builder().reference_time(now).build().unwrap();

    assert_eq!(compute_stats(&result.root), compute_stats(&result.root));
    assert_eq!(
        cleanup_snapshot(&cleanup_suggestions(&result.root, &config)),
        cleanup_snapshot(&cleanup_suggestions(&result.root, &config)),
    );
}

#[tokio::test]
async fn test_cleanup_suggestions_over_scan() {
    let now = SystemTime::now();
    let result = scan(&sample_fs(now)).await;
    let config = CleanupConfig::builder().reference_time(now).build().unwrap();
    let suggestions = cleanup_suggestions(&result.root, &config);

    assert_eq!(paths(suggestions.temp_files.iter().copied()), vec!["root/build.log"]);
    assert_eq!(
        paths(suggestions.large_files.iter().copied()),
        vec!["root/old/archive.iso"]
    );
    // tiny.txt is old but small
    assert_eq!(paths(suggestions.old_files.iter().copied()), vec!["root/old/archive.iso"]);
    assert_eq!(suggestions.duplicates.group_count(), 1);
    assert!(suggestions.duplicates.groups.contains_key(&format!("{}_report.pdf", 4 * MIB)));
    assert_eq!(
        paths(suggestions.empty_folders.iter().copied()),
        vec!["root/empty"]
    );
}

#[test]
fn test_single_temp_file_is_only_temp() {
    let mut root = Entry::new_directory("root", "root", 0);
    root.push_child(Entry::new_file("cache.tmp", "root/cache.tmp", 50));

    let suggestions = cleanup_suggestions(&root, &CleanupConfig::default());
    assert_eq!(paths(suggestions.temp_files.iter().copied()), vec!["root/cache.tmp"]);
    assert!(suggestions.large_files.is_empty());
    assert!(suggestions.old_files.is_empty());
    assert!(!suggestions.duplicates.has_duplicates());
    assert!(suggestions.empty_folders.is_empty());
}

#[tokio::test]
async fn test_duplicate_groups_are_exact() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/x/Same.bin", 10)
        .add_file("root/y/same.BIN", 10)
        .add_file("root/z/same.bin", 10)
        .add_file("root/y/same.bin.bak", 10)
        .add_file("root/w/same.bin", 11)
        .add_file("root/w/lonely.dat", 10);
    let result = scan(&fs).await;
    let report = find_duplicates(&result.root);

    let mut membership: HashMap<&str, usize> = HashMap::new();
    for group in report.groups.values() {
        for entry in &group.entries {
            *membership.entry(entry.path.as_str()).or_insert(0) += 1;
        }
    }

    for path in ["root/x/Same.bin", "root/y/same.BIN", "root/z/same.bin"] {
        assert_eq!(membership.get(path), Some(&1), "{path}");
    }
    for path in ["root/y/same.bin.bak", "root/w/same.bin", "root/w/lonely.dat"] {
        assert!(!membership.contains_key(path), "{path}");
    }
    assert_eq!(report.groups["10_same.bin"].count(), 3);
    assert_eq!(report.groups["10_same.bin"].wasted_bytes, 20);
}

#[tokio::test]
async fn test_query_all_is_permutation() {
    let now = SystemTime::now();
    let result = scan(&sample_fs(now)).await;
    let files = flatten(&result.root);

    for field in [
        SortField::Name,
        SortField::Path,
        SortField::Size,
        SortField::Modified,
        SortField::Type,
    ] {
        let query = Query::builder()
            .sort(SortSpec::new(field, SortDirection::Asc))
            .page_size(1000usize)
            .build()
            .unwrap();
        let page = query.run(&files);

        let mut got = paths(page.items.iter().copied());
        let mut expected = paths(files.iter().copied());
        got.sort();
        expected.sort();
        assert_eq!(got, expected, "sort by {field}");
    }
}

#[tokio::test]
async fn test_pages_reconstruct_sorted_list() {
    let now = SystemTime::now();
    let result = scan(&sample_fs(now)).await;
    let files = flatten(&result.root);

    let base = Query::builder()
        .sort(SortSpec::new(SortField::Name, SortDirection::Asc))
        .page_size(2usize)
        .build()
        .unwrap();
    let expected = paths(base.matching(&files));

    let first = base.run(&files);
    assert_eq!(first.total_pages, 5);
    assert!(first.has_next());
    assert!(!first.has_previous());

    let mut rebuilt = Vec::new();
    for page in 1..=first.total_pages {
        let query = Query { page, ..base.clone() };
        let result = query.run(&files);
        assert!(result.items.len() <= 2);
        rebuilt.extend(paths(result.items.iter().copied()));
    }
    assert_eq!(rebuilt, expected);

    let beyond = Query { page: 99, ..base.clone() }.run(&files);
    assert!(beyond.items.is_empty());
}

#[tokio::test]
async fn test_filter_and_search() {
    let now = SystemTime::now();
    let result = scan(&sample_fs(now)).await;
    let files = flatten(&result.root);

    let large = Query::builder().filter(Filter::Large).build().unwrap().run(&files);
    assert_eq!(
        paths(large.items.iter().copied()),
        vec!["root/old/archive.iso", "root/movies/film.mkv"]
    );

    let docs = Query::builder()
        .filter("document".parse::<Filter>().unwrap())
        .search("REPORT")
        .sort(SortSpec::new(SortField::Path, SortDirection::Asc))
        .build()
        .unwrap()
        .run(&files);
    assert_eq!(
        paths(docs.items.iter().copied()),
        vec!["root/docs/report.pdf", "root/sub/Report.PDF"]
    );

    let by_path = Query::builder().search("old/").build().unwrap().run(&files);
    assert_eq!(by_path.total_matching, 2);
}

#[tokio::test]
async fn test_folders_filter_with_size_range() {
    let now = SystemTime::now();
    let result = scan(&sample_fs(now)).await;
    let all = entries(&result.root);

    let folders = Query::builder().filter(Filter::Folders).build().unwrap();
    let mut names: Vec<String> = folders.matching(&all).iter().map(|e| e.name.to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["docs", "empty", "movies", "old", "sub"]);

    let mid = Query::builder()
        .filter(Filter::Folders)
        .min_size(3 * MIB)
        .max_size(10 * MIB)
        .build()
        .unwrap();
    let mut names: Vec<String> = mid.matching(&all).iter().map(|e| e.name.to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["docs", "sub"]);

    let files = Query::builder().filter(Filter::Files).build().unwrap();
    assert_eq!(files.matching(&all).len(), flatten(&result.root).len());
}

#[tokio::test]
async fn test_size_and_date_ranges_over_scan() {
    let now = SystemTime::now();
    let result = scan(&sample_fs(now)).await;
    let files = flatten(&result.root);

    let sized = Query::builder().min_size(3 * MIB).max_size(4 * MIB).build().unwrap();
    assert_eq!(sized.matching(&files).len(), 3);

    let old = Query::builder()
        .modified_before(now - 700 * DAY)
        .sort(SortSpec::new(SortField::Name, SortDirection::Asc))
        .build()
        .unwrap();
    assert_eq!(
        paths(old.matching(&files)),
        vec!["root/old/archive.iso", "root/old/tiny.txt"]
    );
}

#[tokio::test]
async fn test_export_of_query_matches() {
    let result = scan(&sample_fs(SystemTime::now())).await;
    let files = flatten(&result.root);

    let temp = Query::builder().filter(Filter::Temp).build().unwrap();
    let csv = export_entries(&temp.matching(&files), ExportFormat::Csv).unwrap();
    assert!(csv.lines().nth(1).is_some_and(|row| row.contains("root/build.log")));

    let none = Query::builder().search("no-such-file").build().unwrap();
    assert!(matches!(
        export_entries(&none.matching(&files), ExportFormat::Json),
        Err(ExportError::NothingSelected)
    ));
}
