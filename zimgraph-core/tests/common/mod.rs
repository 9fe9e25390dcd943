// Shared fixture: a small wiki with two nested categories

#![allow(dead_code)]

use zimgraph_archive::MemoryArchive;

pub const MAIN: u32 = 0;
pub const FRUIT: u32 = 1;
pub const APPLES: u32 = 2;
pub const APPLE: u32 = 3;
pub const HOME: u32 = 9;

/// Entry layout:
///
/// ```text
/// 0 Main            -> Category:Fruit, Tractor
/// 1 Category:Fruit  -> Category:Apples, Pear
/// 2 Category:Apples -> Apple (twice), one external link
/// 3 Apple           -> Category:Apples, itself, Tractor
/// 4 Pear            -> Missing
/// 5 Tractor
/// 6 Orphan
/// 7 Apples          redirect to Apple
/// 8 style.css       not HTML
/// 9 Home            redirect to Main, the main entry
/// ```
pub fn wiki() -> MemoryArchive {
    let mut archive = MemoryArchive::new();
    archive.add_article(
        "Main",
        "Main Page",
        r#"<a href="Category:Fruit">Fruit</a> <a href="./Tractor">Tractor</a>"#,
    );
    archive.add_article(
        "Category:Fruit",
        "Fruit",
        r#"<a href="Category:Apples">Apples</a> <a href="Pear">Pear</a>"#,
    );
    archive.add_article(
        "Category:Apples",
        "Apples",
        r#"<a href="Apple">Apple</a> <a href="../Apple">again</a>
           <a href="https://en.wikipedia.org/wiki/Apple">wikipedia</a>"#,
    );
    archive.add_article(
        "Apple",
        "Apple",
        r#"<a href="Category:Apples">up</a> <a href="Apple">self</a> <a href="/Tractor">farm</a>"#,
    );
    archive.add_article("Pear", "Pear", r#"<a href="Missing">gone</a>"#);
    archive.add_article("Tractor", "Tractor", "<p>no links</p>");
    archive.add_article("Orphan", "Orphan", "<p>nobody links here</p>");
    archive.add_redirect("Apples", "Apples", APPLE);
    archive.add_item("style.css", "style.css", "text/css", b"body {}".to_vec());
    archive.add_redirect("Home", "Home", MAIN);
    archive.set_main_entry(HOME);
    archive
}
