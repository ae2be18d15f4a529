//! Stage 1: project title, description, author and tags.

use leptos::prelude::*;

use super::{ErrorBanner, timestamp};
use crate::project::{ProjectSettings, ProjectState};

/// Characters of the description kept in the summary card.
const SUMMARY_DESCRIPTION_CHARS: usize = 100;

fn summary_description(description: &str) -> String {
	if description.chars().count() <= SUMMARY_DESCRIPTION_CHARS {
		return description.to_string();
	}
	let kept: String = description.chars().take(SUMMARY_DESCRIPTION_CHARS).collect();
	format!("{kept}...")
}

/// Recap of the form, once the required fields are filled in.
#[component]
fn ProjectSummary(form: RwSignal<ProjectSettings>) -> impl IntoView {
	move || {
		let settings = form.get();
		(!settings.title.trim().is_empty() && !settings.description.trim().is_empty()).then(|| {
			let author = (!settings.author.is_empty())
				.then(|| view! { <p class="author">"Author: " {settings.author.clone()}</p> });
			let tags = (!settings.tags.is_empty())
				.then(|| view! { <p class="tags">"Tags: " {settings.tags.join(", ")}</p> });
			view! {
				<section class="project-summary">
					<h4>"Project summary"</h4>
					<p class="title">{settings.title.clone()}</p>
					<p class="description">{summary_description(&settings.description)}</p>
					{author}
					{tags}
				</section>
			}
		})
	}
}

#[component]
pub fn SettingsScreen(state: RwSignal<ProjectState>) -> impl IntoView {
	let initial = state
		.with_untracked(|s| s.settings.clone())
		.unwrap_or_else(|| ProjectSettings::new(timestamp()));
	let form = RwSignal::new(initial);
	let tag_input = RwSignal::new(String::new());
	let error = RwSignal::new(None::<String>);

	let add_tag = move || {
		let tag = tag_input.get_untracked();
		form.update(|f| {
			f.add_tag(&tag);
		});
		tag_input.set(String::new());
	};

	let submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		match state.get_untracked().with_settings(form.get_untracked()) {
			Ok(next) => state.set(next),
			Err(e) => error.set(Some(e.to_string())),
		}
	};

	view! {
		<form class="stage settings-stage" on:submit=submit>
			<label>
				"Title"
				<input
					type="text"
					required=true
					prop:value=move || form.with(|f| f.title.clone())
					on:input=move |ev| form.update(|f| f.title = event_target_value(&ev))
				/>
			</label>
			<label>
				"Description"
				<textarea
					required=true
					prop:value=move || form.with(|f| f.description.clone())
					on:input=move |ev| form.update(|f| f.description = event_target_value(&ev))
				></textarea>
			</label>
			<label>
				"Author"
				<input
					type="text"
					prop:value=move || form.with(|f| f.author.clone())
					on:input=move |ev| form.update(|f| f.author = event_target_value(&ev))
				/>
			</label>

			<div class="tags">
				<span>"Tags"</span>
				<ul class="tag-list">
					{move || {
						form.with(|f| f.tags.clone())
							.into_iter()
							.map(|tag| {
								let removed = tag.clone();
								view! {
									<li class="tag">
										{tag}
										<button
											type="button"
											class="tag-remove"
											on:click=move |_| form.update(|f| f.remove_tag(&removed))
										>
											"×"
										</button>
									</li>
								}
							})
							.collect_view()
					}}
				</ul>
				<input
					type="text"
					placeholder="Add a tag"
					prop:value=move || tag_input.get()
					on:input=move |ev| tag_input.set(event_target_value(&ev))
					on:keydown=move |ev| {
						if ev.key() == "Enter" {
							ev.prevent_default();
							add_tag();
						}
					}
				/>
				<button type="button" on:click=move |_| add_tag()>
					"Add"
				</button>
			</div>

			<ProjectSummary form=form />
			<ErrorBanner error=error />
			<div class="actions">
				<button type="submit" class="primary">
					"Continue to data import"
				</button>
			</div>
		</form>
	}
}
