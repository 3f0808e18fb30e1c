use roster::builder::Builder;
use roster::chart::chart;
use roster::fmt::format_rupees;
use roster::map::{clusters, POPUP_MEMBER_LIMIT};

#[tokio::main]
async fn main() {
    // Build a directory and enable all features...
    let directory = Builder::new().enable_all().build().await;

    let batch = match directory.load().await {
        Ok(batch) => batch,
        Err(error) => {
            log::error!("{}", error);
            std::process::exit(1);
        }
    };

    // An optional search term can be passed as first argument...
    let search = std::env::args().nth(1).unwrap_or_default();

    let mut view = directory.view();
    view.set_search(search.as_str());
    let list = view.render(&batch);

    log::info!("Columns: {}", list.columns.join(" | "));
    for record in list.page.items() {
        let row: Vec<String> = list
            .columns
            .iter()
            .map(|column| {
                record
                    .get(column)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            })
            .collect();
        log::info!("{}", row.join(" | "));
    }
    let (first, last) = list.page.range();
    log::info!(
        "Showing {}-{} of {} (page {} of {})",
        first,
        last,
        list.page.total(),
        list.page.number(),
        list.page.page_count()
    );

    let data = chart(&batch, search.as_str());
    log::info!(
        "Chart: {} of {} employees, max {}, average {}",
        data.shown,
        data.total,
        format_rupees(data.max),
        format_rupees(data.mean.round())
    );

    let map = clusters(&batch, &directory.geo());
    for cluster in map.clusters.iter() {
        log::info!(
            "{} ({:.3}, {:.3}): {}",
            cluster.source_label,
            cluster.coordinates.lat,
            cluster.coordinates.lon,
            cluster.popup_text(POPUP_MEMBER_LIMIT)
        );
    }
    log::info!(
        "Map: {} employees in {} places, {} without a known location",
        map.resolved,
        map.clusters.len(),
        map.unresolved
    );
}
