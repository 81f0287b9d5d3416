//! Turns leaf URLs into rows of the output table.
//!
//! Records are extracted by a bounded pool of tasks, each tagged with the
//! position of its URL in discovery order. A single consumer drains their
//! results and commits rows strictly in that order, holding early arrivals
//! in a reorder buffer.

use crate::config::{ExtractorKind, HarvestConfig};
use crate::error::Result;
use crate::extract::extract;
use crate::fetch::Fetcher;
use crate::progress::Progress;
use crate::table::{HikeRecord, Table};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};

/// How leaf records are processed
#[derive(Debug, Clone, Copy)]
pub struct AssembleOptions {
    /// Records in flight at once; 1 processes them one after another
    pub max_concurrency: usize,
    /// Deadline for each page fetched for a record: the hike page and its
    /// trip-report listing each get this much
    pub record_timeout: Duration,
    pub extractor: ExtractorKind,
}

impl AssembleOptions {
    pub fn from_config(config: &HarvestConfig) -> Self {
        let worst_case = config.worst_case_fetch();
        if Duration::from_secs(config.record_timeout_secs) < worst_case {
            ::log::warn!(
                "record_timeout_secs ({}) is shorter than a fully retried fetch ({:.1}s)",
                config.record_timeout_secs,
                worst_case.as_secs_f64()
            );
        }
        Self {
            max_concurrency: config.max_concurrency.max(1),
            record_timeout: Duration::from_secs(config.record_timeout_secs),
            extractor: config.extractor,
        }
    }
}

/// Counts from one assembly pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Rows committed, one per leaf URL
    pub rows: usize,
    /// Rows whose hike page could not be read in time; every field null
    pub omitted: usize,
}

enum Outcome {
    Extracted(HikeRecord),
    Omitted(HikeRecord),
}

async fn process_one(
    fetcher: &dyn Fetcher,
    kind: ExtractorKind,
    deadline: Duration,
    link: &str,
) -> Outcome {
    match extract(fetcher, kind, link, deadline).await {
        Ok(record) => Outcome::Extracted(record),
        Err(e) => {
            ::log::warn!("Omitting {}: {}", link, e);
            Outcome::Omitted(HikeRecord::omitted(link))
        }
    }
}

fn commit(table: &mut Table, stats: &mut AssemblyStats, outcome: Outcome) -> Result<()> {
    let record = match outcome {
        Outcome::Extracted(record) => record,
        Outcome::Omitted(record) => {
            stats.omitted += 1;
            record
        }
    };
    table.commit_row(record)?;
    stats.rows += 1;
    Ok(())
}

/// Extracts one record per leaf URL and assembles them into a table whose
/// row order is `leaf_links` order.
pub async fn assemble(
    fetcher: Arc<dyn Fetcher>,
    leaf_links: &[String],
    options: &AssembleOptions,
    progress: &mut dyn Progress,
) -> Result<(Table, AssemblyStats)> {
    let total = leaf_links.len();
    let concurrency = options.max_concurrency.max(1);
    progress.begin(total);
    ::log::info!("Loading {} hikes, {} at a time", total, concurrency);

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let (result_tx, mut result_rx) = mpsc::channel::<(usize, Outcome)>(concurrency * 2);

    for (index, link) in leaf_links.iter().cloned().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        let semaphore = Arc::clone(&semaphore);
        let result_tx = result_tx.clone();
        let kind = options.extractor;
        let deadline = options.record_timeout;

        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            let outcome = process_one(fetcher.as_ref(), kind, deadline, &link).await;
            if result_tx.send((index, outcome)).await.is_err() {
                ::log::error!("Result channel closed before {} was delivered", link);
            }
        });
    }

    // Drop our copy so the channel closes once every task is done
    drop(result_tx);

    let mut table = Table::new();
    let mut stats = AssemblyStats::default();
    let mut pending: BTreeMap<usize, Outcome> = BTreeMap::new();
    let mut next_index = 0;

    while let Some((index, outcome)) = result_rx.recv().await {
        pending.insert(index, outcome);
        while let Some(outcome) = pending.remove(&next_index) {
            commit(&mut table, &mut stats, outcome)?;
            next_index += 1;
            progress.item_done(next_index, total);
        }
    }

    // A task that died without reporting still owes its row
    for (index, link) in leaf_links.iter().enumerate().skip(next_index) {
        let outcome = pending.remove(&index).unwrap_or_else(|| {
            ::log::error!("No result for {}, recording it as omitted", link);
            Outcome::Omitted(HikeRecord::omitted(link))
        });
        commit(&mut table, &mut stats, outcome)?;
        progress.item_done(index + 1, total);
    }

    ::log::info!(
        "Finished loading hikes: {} rows, {} omitted",
        stats.rows,
        stats.omitted
    );
    let filled = table.filled_counts();
    for ((column, count), (_, filled)) in table.column_counts().into_iter().zip(filled) {
        let line = format!("{}: {} entries, {} filled", column.header(), count, filled);
        ::log::info!("{}", line);
        progress.log(&line);
    }
    progress.finish();

    Ok((table, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::progress::NullProgress;
    use crate::table::{Cell, Column};
    use crate::fetch::trip_report_url;
    use crate::tests::fixtures::{self, LeafFixture};

    fn options(max_concurrency: usize, record_timeout: Duration) -> AssembleOptions {
        AssembleOptions {
            max_concurrency,
            record_timeout,
            extractor: ExtractorKind::LineOffset,
        }
    }

    fn links() -> Vec<String> {
        vec![
            fixtures::LAKE_SERENE.to_string(),
            fixtures::MAILBOX_PEAK.to_string(),
            fixtures::RATTLESNAKE_LEDGE.to_string(),
        ]
    }

    fn site() -> MemoryFetcher {
        let fetcher = LeafFixture::lake_serene().serve(MemoryFetcher::new(), fixtures::LAKE_SERENE);
        let fetcher = LeafFixture::mailbox_peak().serve(fetcher, fixtures::MAILBOX_PEAK);
        LeafFixture::rattlesnake_ledge().serve(fetcher, fixtures::RATTLESNAKE_LEDGE)
    }

    #[derive(Default)]
    struct Recorder {
        begun: Option<usize>,
        done: Vec<usize>,
        lines: Vec<String>,
        finished: bool,
    }

    impl Progress for Recorder {
        fn begin(&mut self, total: usize) {
            self.begun = Some(total);
        }
        fn log(&mut self, msg: &str) {
            self.lines.push(msg.to_string());
        }
        fn item_done(&mut self, done: usize, _total: usize) {
            self.done.push(done);
        }
        fn finish(&mut self) {
            self.finished = true;
        }
    }

    #[tokio::test]
    async fn test_rows_follow_discovery_order_despite_completion_order() {
        // first record finishes last
        let fetcher = site().with_delay(fixtures::LAKE_SERENE, Duration::from_millis(80));
        let (table, stats) = assemble(
            Arc::new(fetcher),
            &links(),
            &options(3, Duration::from_secs(5)),
            &mut NullProgress,
        )
        .await
        .unwrap();

        assert_eq!(stats, AssemblyStats { rows: 3, omitted: 0 });
        let expected: Vec<Cell> = links().into_iter().map(Cell::Text).collect();
        assert_eq!(table.column(Column::Link), expected.as_slice());
        assert_eq!(
            table.cell(0, Column::Title),
            Some(&Cell::Text("Lake Serene".to_string()))
        );
    }

    #[tokio::test]
    async fn test_sequential_matches_concurrent() {
        let (sequential, _) = assemble(
            Arc::new(site()),
            &links(),
            &options(1, Duration::from_secs(5)),
            &mut NullProgress,
        )
        .await
        .unwrap();
        let (concurrent, _) = assemble(
            Arc::new(site()),
            &links(),
            &options(8, Duration::from_secs(5)),
            &mut NullProgress,
        )
        .await
        .unwrap();

        for column in Column::ALL {
            assert_eq!(sequential.column(column), concurrent.column(column));
        }
    }

    #[tokio::test]
    async fn test_timed_out_hike_page_is_all_null_row() {
        let fetcher = site().with_delay(fixtures::MAILBOX_PEAK, Duration::from_secs(5));
        let (table, stats) = assemble(
            Arc::new(fetcher),
            &links(),
            &options(3, Duration::from_millis(100)),
            &mut NullProgress,
        )
        .await
        .unwrap();

        assert_eq!(stats, AssemblyStats { rows: 3, omitted: 1 });
        for column in Column::ALL {
            let cell = table.cell(1, column).unwrap();
            match column {
                Column::Link => assert_eq!(cell, &Cell::Text(fixtures::MAILBOX_PEAK.to_string())),
                _ => assert!(cell.is_null(), "{} should be null", column.header()),
            }
        }
        assert!(!table.cell(2, Column::Title).unwrap().is_null());
    }

    #[tokio::test]
    async fn test_slow_trip_reports_do_not_omit_the_row() {
        let fetcher = site().with_delay(
            &trip_report_url(fixtures::LAKE_SERENE),
            Duration::from_secs(2),
        );
        let (table, stats) = assemble(
            Arc::new(fetcher),
            &links(),
            &options(3, Duration::from_millis(200)),
            &mut NullProgress,
        )
        .await
        .unwrap();

        assert_eq!(stats, AssemblyStats { rows: 3, omitted: 0 });
        assert_eq!(
            table.cell(0, Column::Title),
            Some(&Cell::Text("Lake Serene".to_string()))
        );
        assert_eq!(table.cell(0, Column::Gain), Some(&Cell::Float(2000.0)));
        assert!(table.cell(0, Column::ReportCount).unwrap().is_null());
        assert!(table.cell(0, Column::ReportDate).unwrap().is_null());
    }

    #[tokio::test]
    async fn test_unreachable_page_still_gets_a_row() {
        let mut all = links();
        all.insert(1, "https://hikes.example.org/go-hiking/hikes/gone".to_string());
        let (table, stats) = assemble(
            Arc::new(site()),
            &all,
            &options(2, Duration::from_secs(5)),
            &mut NullProgress,
        )
        .await
        .unwrap();

        assert_eq!(stats, AssemblyStats { rows: 4, omitted: 1 });
        for (_, count) in table.column_counts() {
            assert_eq!(count, 4);
        }
        assert!(table.cell(1, Column::Title).unwrap().is_null());
        assert_eq!(
            table.cell(2, Column::Title),
            Some(&Cell::Text("Mailbox Peak".to_string()))
        );
    }

    #[tokio::test]
    async fn test_progress_callbacks() {
        let mut recorder = Recorder::default();
        assemble(
            Arc::new(site()),
            &links(),
            &options(2, Duration::from_secs(5)),
            &mut recorder,
        )
        .await
        .unwrap();

        assert_eq!(recorder.begun, Some(3));
        assert_eq!(recorder.done, vec![1, 2, 3]);
        assert_eq!(recorder.lines.len(), Column::COUNT);
        assert!(recorder.lines.iter().all(|l| l.contains(": 3 entries, ")));
        assert!(recorder.lines.contains(&"REGION: 3 entries, 2 filled".to_string()));
        assert!(recorder.lines.contains(&"LINK: 3 entries, 3 filled".to_string()));
        assert!(recorder.finished);
    }

    #[tokio::test]
    async fn test_no_links_gives_empty_table() {
        let (table, stats) = assemble(
            Arc::new(MemoryFetcher::new()),
            &[],
            &options(2, Duration::from_secs(1)),
            &mut NullProgress,
        )
        .await
        .unwrap();
        assert!(table.is_empty());
        assert_eq!(stats, AssemblyStats::default());
    }
}
