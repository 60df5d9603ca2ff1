use maud::{html, Markup, DOCTYPE};

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (STYLE) }
            }
            body {
              header class="site-header" {
                  svg
                      xmlns="http://www.w3.org/2000/svg"
                      width="24"
                      height="24"
                      viewBox="0 0 24 24"
                      fill="none"
                      stroke="#524ed2"
                      stroke-width="2"
                      stroke-linecap="round"
                      stroke-linejoin="round"
                  {
                      path stroke="none" d="M0 0h24v24H0z" fill="none" {}
                      path d="M8 5v14" {}
                      path d="M5 5v4a3 3 0 0 0 6 0v-4" {}
                      path d="M16 5a3 3 0 0 1 3 3v5h-3z" {}
                      path d="M16 13v6" {}
                  }
                  h3 { "Restaurant Ratings" }
                  nav {
                      ul {
                          li { a href="/" { "Home" } }
                          li { a href="/all_supported_towns" { "Towns (JSON)" } }
                      }
                  }
              }
                (content)
            }
        }
    }
}

const STYLE: &str = "
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; }
.site-header { display: flex; align-items: center; gap: 1rem; padding: 0.75rem 1.5rem; box-shadow: 0 1px 3px #0002; }
.site-header nav ul { display: flex; gap: 1rem; list-style: none; margin: 0; padding: 0; }
.container { max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
.card { border: 1px solid #e5e7eb; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1.5rem; }
.score { font-weight: 600; color: #524ed2; }
.sites { display: flex; gap: 1.5rem; font-size: 0.9em; color: #4b5563; }
.review { font-style: italic; color: #374151; }
.photo { max-height: 160px; border-radius: 6px; }
";
