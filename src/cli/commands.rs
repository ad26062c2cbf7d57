use url::Url;

use crate::app::{AppContext, BlogwatchError, Result};
use crate::domain::{Blog, Subscriber};
use crate::fetcher::TlsPolicy;
use crate::monitor::FetchSource;
use crate::store::Registry;

/// Only absolute http(s) URLs can be monitored.
pub fn validate_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(url.trim_end_matches('/').to_string()),
        other => Err(BlogwatchError::Other(format!(
            "Unsupported URL scheme `{}` in {}",
            other, url
        ))),
    }
}

pub fn add_blog(
    ctx: &AppContext,
    url: &str,
    name: Option<String>,
    category: Option<String>,
    insecure_tls: bool,
) -> Result<()> {
    let url = validate_url(url)?;

    if ctx.store.get_blog_by_url(&url)?.is_some() {
        println!("Blog already monitored: {}", url);
        return Ok(());
    }

    let mut blog = Blog::new(url.clone());
    if let Some(name) = name {
        blog.name = name;
    }
    if let Some(category) = category {
        blog.category = category;
    }
    blog.accept_invalid_certs = insecure_tls;

    ctx.store.add_blog(&blog)?;
    println!("Blog \"{}\" added: {}", blog.name, url);
    if insecure_tls {
        println!("  Warning: certificates for this blog will not be verified");
    }
    Ok(())
}

/// Deletes the blog, its subscriptions and its snapshot, so adding it back
/// later starts from a cold start.
pub fn remove_blog(ctx: &AppContext, url: &str) -> Result<()> {
    let blog = find_blog(ctx, url)?;
    ctx.store.delete_blog(blog.id)?;
    ctx.snapshots.remove(&blog.url)?;
    println!("Removed blog: {}", blog.url);
    Ok(())
}

pub fn set_active(ctx: &AppContext, url: &str, active: bool) -> Result<()> {
    let blog = find_blog(ctx, url)?;
    ctx.store.set_blog_active(blog.id, active)?;
    println!(
        "{} {}",
        if active { "Resumed" } else { "Paused" },
        blog.url
    );
    Ok(())
}

pub fn list_blogs(ctx: &AppContext) -> Result<()> {
    let blogs = ctx.store.get_all_blogs()?;

    if blogs.is_empty() {
        println!("No blogs");
        return Ok(());
    }

    for blog in blogs {
        let checked = blog
            .last_checked
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        let state = if blog.is_active { "" } else { " [paused]" };
        println!(
            "{} ({}){}\n  {}\n  last checked: {}",
            blog.name, blog.category, state, blog.url, checked
        );
    }

    Ok(())
}

pub fn subscribe(ctx: &AppContext, email: &str, url: &str) -> Result<()> {
    let blog = find_blog(ctx, url)?;
    let subscriber_id = match ctx.store.get_subscriber_by_email(email)? {
        Some(subscriber) => subscriber.id,
        None => ctx.store.add_subscriber(email)?,
    };

    ctx.store.subscribe(subscriber_id, &blog)?;
    println!("{} subscribed to {}", email, blog.url);
    Ok(())
}

pub fn unsubscribe(ctx: &AppContext, email: &str, url: &str) -> Result<()> {
    let subscriber = find_subscriber(ctx, email)?;
    let url = validate_url(url)?;
    ctx.store.unsubscribe(subscriber.id, &url)?;
    println!("{} unsubscribed from {}", email, url);
    Ok(())
}

pub fn list_posts(ctx: &AppContext, email: &str, mark_seen: bool) -> Result<()> {
    let subscriber = find_subscriber(ctx, email)?;
    let posts = ctx.store.get_posts_by_subscriber(subscriber.id)?;

    if posts.is_empty() {
        println!("No posts");
        return Ok(());
    }

    for post in &posts {
        let marker = if post.is_new { "●" } else { " " };
        let date = post
            .published_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "          ".to_string());
        println!("{} {} {}", marker, date, post.title);
        if let Some(link) = &post.link {
            println!("             {}", link);
        }
    }

    if mark_seen {
        let count = ctx.store.mark_posts_seen(subscriber.id)?;
        println!("\nMarked {} posts as seen", count);
    }

    Ok(())
}

pub async fn fetch_blog(ctx: &AppContext, url: &str, insecure_tls: bool) -> Result<()> {
    let url = validate_url(url)?;
    let tls = TlsPolicy::from_opt_out(insecure_tls || ctx.config.fetch.accept_invalid_certs);

    let fetched = ctx.monitor.fetcher().try_fetch(&url, tls).await?;

    for attempt in &fetched.attempts {
        eprintln!("  {} -> {:?}", attempt.url, attempt.outcome);
    }
    match &fetched.source {
        FetchSource::Feed(feed_url) => eprintln!("Source: feed {}", feed_url),
        FetchSource::Html => eprintln!("Source: page {}", url),
    }

    println!("{}", serde_json::to_string_pretty(&fetched.snapshot)?);
    Ok(())
}

pub async fn check_blogs(ctx: &AppContext) -> Result<()> {
    let summary = ctx.batch_runner().run().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn find_blog(ctx: &AppContext, url: &str) -> Result<Blog> {
    let url = validate_url(url)?;
    ctx.store
        .get_blog_by_url(&url)?
        .ok_or(BlogwatchError::BlogNotFound(url))
}

fn find_subscriber(ctx: &AppContext, email: &str) -> Result<Subscriber> {
    ctx.store
        .get_subscriber_by_email(email)?
        .ok_or_else(|| BlogwatchError::SubscriberNotFound(email.to_string()))
}
