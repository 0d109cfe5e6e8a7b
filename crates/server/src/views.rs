//! HTML rendering. Pure functions from state to markup; handlers decide
//! which one to call and with what status.

use client_core::BannerForm;
use maud::{html, Markup, DOCTYPE};
use shared::domain::{format_price, Banner, BannerId, View};

const APP_TITLE: &str = "AI Food Banners";

const CSS: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#fafaf9;color:#1c1917}\
header.app-header{display:flex;justify-content:space-between;align-items:center;padding:1rem 2rem;background:#fff;border-bottom:1px solid #e7e5e4}\
header.app-header nav{display:flex;gap:.5rem}\
header.app-header form{margin:0}\
header.app-header button[aria-current=page]{background:#ea580c;color:#fff;border-color:#ea580c}\
main{max-width:72rem;margin:0 auto;padding:2rem}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(18rem,1fr));gap:1.5rem}\
.card{background:#fff;border-radius:.75rem;overflow:hidden;box-shadow:0 1px 3px rgba(0,0,0,.1)}\
.card img{width:100%;aspect-ratio:1;object-fit:cover}\
.card .body{padding:1rem}\
.price{font-weight:700;color:#ea580c}\
.error{color:#b91c1c}\
.empty{color:#78716c;text-align:center;padding:3rem 0}\
.previews{display:flex;flex-wrap:wrap;gap:.5rem}\
.previews img{width:6rem;height:6rem;object-fit:cover;border-radius:.5rem}\
table{width:100%;border-collapse:collapse}\
td,th{padding:.5rem;border-bottom:1px solid #e7e5e4;text-align:left}\
td img{width:4rem;height:4rem;object-fit:cover}\
";

/// What every page needs to draw the header and format prices.
#[derive(Debug, Clone, Copy)]
pub struct PageChrome<'a> {
    pub is_admin: bool,
    pub view: View,
    pub currency_prefix: &'a str,
}

/// Values shown in the edit form; after a rejected edit these are the
/// submitted values, not the stored ones.
#[derive(Debug, Clone)]
pub struct EditDraft<'a> {
    pub id: &'a BannerId,
    pub title: &'a str,
    pub price: String,
}

impl<'a> EditDraft<'a> {
    pub fn from_banner(banner: &'a Banner) -> Self {
        Self {
            id: &banner.id,
            title: &banner.title,
            price: format!("{:.2}", banner.price),
        }
    }
}

fn base_document(chrome: PageChrome<'_>, title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | " (APP_TITLE) }
                style { (CSS) }
            }
            body {
                (app_header(chrome))
                main { (content) }
            }
        }
    }
}

fn app_header(chrome: PageChrome<'_>) -> Markup {
    html! {
        header.app-header {
            a href="/" { strong { (APP_TITLE) } }
            nav {
                (view_button("public", "Public View", chrome.view == View::Public))
                @if chrome.is_admin {
                    (view_button("admin", "Admin Panel", chrome.view == View::Admin))
                    form method="post" action="/logout" {
                        button type="submit" { "Logout" }
                    }
                } @else {
                    a href="/login" { "Admin Login" }
                }
            }
        }
    }
}

fn view_button(view: &str, label: &str, current: bool) -> Markup {
    html! {
        form method="post" action="/view" {
            input type="hidden" name="view" value=(view);
            button type="submit" aria-current=[current.then_some("page")] { (label) }
        }
    }
}

pub fn gallery(chrome: PageChrome<'_>, banners: &[Banner]) -> Markup {
    let content = html! {
        h1 { "Today's Specials" }
        @if banners.is_empty() {
            p.empty { "No banners available at the moment. Check back soon!" }
        } @else {
            div.grid {
                @for banner in banners {
                    article.card {
                        img src=(banner.image_data) alt=(banner.title);
                        div.body {
                            h2 { (banner.title) }
                            p.price { (format_price(chrome.currency_prefix, banner.price)) }
                        }
                    }
                }
            }
        }
    };
    base_document(chrome, "Today's Specials", content)
}

pub fn dashboard(
    chrome: PageChrome<'_>,
    banners: &[Banner],
    form: &BannerForm,
    notice: Option<&str>,
) -> Markup {
    let busy = form.is_in_flight();
    let content = html! {
        h1 { "Admin Dashboard" }
        p { "Manage your promotional food banners." }

        section {
            h2 { "Create New Banner" }
            @if let Some(notice) = notice {
                p.error role="alert" { (notice) }
            }
            @if let Some(error) = form.error() {
                @if notice != Some(error) {
                    p.error role="alert" { (error) }
                }
            }
            @if busy {
                p { "Generating banner..." }
            }

            @if !form.images.is_empty() {
                div.previews {
                    @for (index, image) in form.images.images().iter().enumerate() {
                        figure {
                            img src={ "/admin/previews/" (image.preview.id()) } alt=(image.file.filename);
                            form method="post" action={ "/admin/images/" (index) "/remove" } {
                                button type="submit" disabled[busy] { "Remove" }
                            }
                        }
                    }
                }
            }

            form method="post" action="/admin/images" enctype="multipart/form-data" {
                fieldset disabled[busy] {
                    input type="hidden" name="source" value="picker";
                    label {
                        "Add images "
                        input type="file" name="images" accept="image/*" multiple;
                    }
                    button type="submit" { "Upload" }
                }
            }

            form method="post" action="/admin/banners" enctype="multipart/form-data" {
                fieldset disabled[busy] {
                    label {
                        "Banner Title "
                        input type="text" name="title" value=(form.title) placeholder="e.g., Gourmet Burger Special";
                    }
                    label {
                        "Price "
                        input type="text" inputmode="decimal" name="price" value=(form.price) placeholder="e.g., 35.90";
                    }
                    label {
                        "Food Images "
                        input type="file" name="images" accept="image/*" multiple;
                    }
                    p { "Upload one or more images of the food items to be included in the banner." }
                    button type="submit" { "Generate Banner" }
                }
            }
        }

        section {
            h2 { "Active Banners" }
            @if banners.is_empty() {
                p.empty { "No banners created yet." }
            } @else {
                table {
                    thead {
                        tr { th { "Preview" } th { "Title" } th { "Price" } th { "Actions" } }
                    }
                    tbody {
                        @for banner in banners {
                            tr {
                                td { img src=(banner.image_data) alt=(banner.title); }
                                td { (banner.title) }
                                td.price { (format_price(chrome.currency_prefix, banner.price)) }
                                td {
                                    a href={ "/admin/banners/" (banner.id) "/edit" } { "Edit" }
                                    form method="post" action={ "/admin/banners/" (banner.id) "/delete" } {
                                        button type="submit" { "Delete" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    base_document(chrome, "Admin Dashboard", content)
}

pub fn access_denied(chrome: PageChrome<'_>, message: &str) -> Markup {
    let content = html! {
        section {
            h1 { "Access Denied" }
            p { (message) }
            a href="/login" { "Admin Login" }
        }
    };
    base_document(chrome, "Access Denied", content)
}

pub fn login(chrome: PageChrome<'_>, error: Option<&str>) -> Markup {
    let content = html! {
        section {
            h1 { "Admin Login" }
            @if let Some(error) = error {
                p.error role="alert" { (error) }
            }
            form method="post" action="/login" {
                label { "Username " input type="text" name="username" autocomplete="username"; }
                label { "Password " input type="password" name="password" autocomplete="current-password"; }
                button type="submit" { "Login" }
                a href="/" { "Cancel" }
            }
        }
    };
    base_document(chrome, "Admin Login", content)
}

pub fn edit(chrome: PageChrome<'_>, draft: &EditDraft<'_>, error: Option<&str>) -> Markup {
    let content = html! {
        section {
            h1 { "Edit Banner" }
            @if let Some(error) = error {
                p.error role="alert" { (error) }
            }
            form method="post" action={ "/admin/banners/" (draft.id) } {
                label { "Banner Title " input type="text" name="title" value=(draft.title); }
                label { "Price " input type="text" inputmode="decimal" name="price" value=(draft.price); }
                button type="submit" { "Save Changes" }
                a href="/" { "Cancel" }
            }
        }
    };
    base_document(chrome, "Edit Banner", content)
}

pub fn not_found(chrome: PageChrome<'_>, message: &str) -> Markup {
    let content = html! {
        section {
            h1 { "Not Found" }
            p { (message) }
            a href="/" { "Back" }
        }
    };
    base_document(chrome, "Not Found", content)
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
