//! Basic usage example of the cache-aside book service.

use cache_aside::{
    backend::InMemoryBackend, error::Result, observability::CounterMetrics, Book, BookService,
    CacheService, InMemoryRepository,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .ok();

    println!("\n=== Cache Aside - Basic Example ===\n");

    // 1. Wire repository, cache and service
    println!("1. Seeding repository and in-memory cache...");
    let repo = Arc::new(InMemoryRepository::with_entities([
        Book::new(1, "Book1", "AuthorX"),
        Book::new(2, "Война и мир", "Л.Н. Толстой"),
        Book::new(3, "Капитанская дочка", "А.С. Пушкин"),
        Book::new(6, "Тихий дон", "М. А. Шолохов"),
    ]));
    let metrics = CounterMetrics::new();
    let cache = CacheService::with_metrics(InMemoryBackend::new(), Box::new(metrics.clone()));
    let books: BookService = BookService::new(repo.clone(), cache.clone());
    println!("   ✓ {} books in repository\n", repo.len());

    // 2. Read-through
    println!("2. Finding book 1 twice:");
    books.find_by_id(&1).await?;
    if let Some(book) = books.find_by_id(&1).await? {
        println!("   ✓ {} by {}", book.title, book.author);
    }
    println!("   ✓ Repository queried {} time(s)\n", repo.fetch_by_id_calls(&1));

    // 3. Absent results are not cached
    println!("3. Finding missing book 10 twice:");
    books.find_by_id(&10).await?;
    books.find_by_id(&10).await?;
    println!("   ✓ Repository queried {} time(s)\n", repo.fetch_by_id_calls(&10));

    // 4. Write-through
    println!("4. Saving book 4, then finding it:");
    let saved = books.save(&Book::new(4, "Капитанская дочка", "А.С. Пушкин")).await?;
    books.find_by_id(&saved.id).await?;
    println!("   ✓ Repository queried {} time(s)\n", repo.fetch_by_id_calls(&4));

    // 5. Save without caching
    println!("5. Saving book 5 without caching, then finding it twice:");
    books
        .save_without_caching(&Book::new(5, "Война и мир", "Л.Н. Толстой"))
        .await?;
    books.find_by_id(&5).await?;
    books.find_by_id(&5).await?;
    println!("   ✓ Repository queried {} time(s)\n", repo.fetch_by_id_calls(&5));

    // 6. Delete with and without eviction
    println!("6. Deleting books 2 (evict) and 3 (no eviction):");
    if let Some(book) = books.find_by_id(&2).await? {
        books.delete(&book).await?;
    }
    if let Some(book) = books.find_by_id(&3).await? {
        books.delete_without_eviction(&book).await?;
    }
    println!(
        "   ✓ Book 2 after delete: {:?}",
        books.find_by_id(&2).await?.map(|b| b.title)
    );
    println!(
        "   ✓ Book 3 after delete (stale): {:?}\n",
        books.find_by_id(&3).await?.map(|b| b.title)
    );

    // 7. Composite key
    println!("7. Finding by title and author twice:");
    books.find_by_composite_key("Тихий дон", "М. А. Шолохов").await?;
    if let Some(book) = books.find_by_composite_key("Тихий дон", "М. А. Шолохов").await? {
        println!("   ✓ Found book {}", book.id);
    }
    println!(
        "   ✓ Repository queried {} time(s)\n",
        repo.fetch_by_composite_key_calls("Тихий дон", "М. А. Шолохов")
    );

    // 8. Cache contents
    println!("8. Cache contents:");
    let backend = cache.expander().backend();
    for key in backend.keys() {
        println!("   - {}", key);
    }
    backend.log_stats();

    let stats = metrics.snapshot();
    println!(
        "\n   hits={} misses={} puts={} evictions={} (hit ratio {:.2})",
        stats.hits,
        stats.misses,
        stats.puts,
        stats.evictions,
        stats.hit_ratio()
    );

    books.clear_cache().await?;
    println!("   ✓ Cache cleared ({} entries)\n", backend.len());

    println!("=== Example Complete ===\n");
    Ok(())
}
